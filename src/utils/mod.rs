//! Utility functions and types

mod cancel;
mod metrics;
mod parallel;

pub use cancel::{CancellationToken, Deadline};
pub use metrics::Timer;
pub use parallel::{ParallelConfig, WorkerPool};
