//! Queue module.
//!
//! Provides:
//! - The FIFO job queue with submit/remove/stop
//! - The single background worker
//! - Status notifications to observers

pub mod manager;
pub mod reporter;
pub mod runner;
mod worker;

pub use manager::{QueueManager, StatusCounts};
pub use reporter::{StatusEvent, StatusReceiver, StatusReporter};
pub use runner::JobRunner;
