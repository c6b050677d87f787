//! Status notifications from the worker to observers.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::job::{Job, JobId};

/// A job state change or progress note.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StatusEvent {
    /// A job was added to the queue.
    Submitted(Job),
    /// The worker took a job off the queue.
    Claimed(Job),
    /// A stage of a running job made progress.
    Progress { job_id: JobId, message: String },
    /// A job reached a terminal state.
    Finished(Job),
    /// A pending job was removed before it started.
    Removed { job_id: JobId },
    /// The worker exited after a stop request.
    WorkerStopped,
}

/// Receiving side of the status channel, drained by the presentation layer.
pub type StatusReceiver = mpsc::UnboundedReceiver<StatusEvent>;

/// Sending side of the status channel.
///
/// Cheap to clone and safe to call from any task. Reporting never blocks and
/// never fails; events sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    tx: mpsc::UnboundedSender<StatusEvent>,
}

impl StatusReporter {
    /// Create a reporter and its receiver.
    pub fn channel() -> (Self, StatusReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// A reporter nobody listens to.
    pub fn detached() -> Self {
        Self::channel().0
    }

    pub fn report(&self, event: StatusEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Status receiver dropped, discarding event");
        }
    }

    pub fn progress(&self, job_id: JobId, message: impl Into<String>) {
        self.report(StatusEvent::Progress {
            job_id,
            message: message.into(),
        });
    }
}
