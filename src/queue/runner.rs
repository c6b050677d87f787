//! The seam between the queue and whatever executes a job.

use async_trait::async_trait;

use crate::job::Job;
use crate::queue::reporter::StatusReporter;

/// Executes one claimed job.
///
/// Implementations must leave the job in a terminal state and must not
/// return errors; failures are recorded on the job itself.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, job: &mut Job, reporter: &StatusReporter);
}
