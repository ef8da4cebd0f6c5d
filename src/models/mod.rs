//! Shared data models spanning the pipeline stages.

pub mod bar;
pub mod indicators;
pub mod signal;

pub use bar::{find_bar, Bar};
pub use indicators::{IndicatorParams, IndicatorPoint};
pub use signal::{DetectedSignal, SignalEvent, SignalType};
