//! Job module.

pub mod item;
pub mod status;

pub use item::{Job, JobId};
pub use status::JobStatus;
