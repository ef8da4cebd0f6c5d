//! Core application primitives (orchestration, retries, scheduling)

pub mod bootstrap;
pub mod pipeline;
pub mod retry;
pub mod scheduler;

pub use bootstrap::*;
pub use pipeline::*;
pub use retry::*;
pub use scheduler::*;
