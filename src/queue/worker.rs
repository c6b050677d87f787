//! The background worker loop.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::time::{sleep, timeout};

use crate::config::QueueConfig;
use crate::queue::manager::Shared;
use crate::queue::reporter::StatusEvent;
use crate::queue::runner::JobRunner;

/// Drain the queue one job at a time until shutdown is requested.
///
/// Shutdown is checked between jobs only; a running job always finishes.
pub(crate) async fn run_worker(shared: Arc<Shared>, runner: Arc<dyn JobRunner>, config: QueueConfig) {
    tracing::debug!("Queue worker started");

    loop {
        if shared.is_shutting_down() {
            break;
        }

        let Some(mut job) = shared.claim_next() else {
            let woken = timeout(config.poll_interval(), shared.wakeup.notified())
                .await
                .is_ok();
            if !woken && !shared.is_shutting_down() {
                sleep(config.idle_interval()).await;
            }
            continue;
        };

        tracing::info!("Processing job {}", job.id);
        shared.reporter.report(StatusEvent::Claimed(job.clone()));

        let outcome = AssertUnwindSafe(runner.run(&mut job, &shared.reporter))
            .catch_unwind()
            .await;
        if outcome.is_err() {
            tracing::error!("Job {} panicked", job.id);
            job.fail("Error: job aborted unexpectedly");
        } else if !job.status.is_terminal() {
            job.fail("Error: job ended without a result");
        }

        shared.publish(job.clone());
        shared.reporter.report(StatusEvent::Finished(job));
    }

    tracing::debug!("Queue worker stopped");
    shared.reporter.report(StatusEvent::WorkerStopped);
    shared.mark_worker_exited();
}
