//! Signal detection and materialization.

pub mod detector;
pub mod materializer;

pub use detector::{DetectorConfig, SignalDetector, SignalError, TriggerMode};
pub use materializer::{MaterializeError, SignalMaterializer, StopLossTakeProfit};
