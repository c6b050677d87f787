//! The job queue and its single background worker.

use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

use crate::config::QueueConfig;
use crate::job::{Job, JobId, JobStatus};
use crate::queue::reporter::{StatusEvent, StatusReceiver, StatusReporter};
use crate::queue::runner::JobRunner;
use crate::queue::worker::run_worker;

/// Number of jobs in each state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub active: usize,
    pub pending: usize,
    pub completed: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
struct QueueState {
    next_id: u64,
    /// Every visible job, keyed (and therefore ordered) by submission.
    jobs: BTreeMap<JobId, Job>,
    /// Jobs waiting for the worker, oldest first.
    pending: VecDeque<JobId>,
}

/// State shared between the controller and the worker.
#[derive(Debug)]
pub(crate) struct Shared {
    state: Mutex<QueueState>,
    pub(crate) wakeup: Notify,
    shutdown: AtomicBool,
    /// True from spawn until the worker loop has fully exited.
    running: watch::Sender<bool>,
    pub(crate) reporter: StatusReporter,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Called by the worker as its last action.
    pub(crate) fn mark_worker_exited(&self) {
        self.running.send_replace(false);
    }

    /// Take the oldest pending job and mark it in progress, in one step.
    pub(crate) fn claim_next(&self) -> Option<Job> {
        let mut state = self.lock();
        while let Some(id) = state.pending.pop_front() {
            if let Some(job) = state.jobs.get_mut(&id) {
                if job.status == JobStatus::Pending {
                    job.mark_in_progress();
                    return Some(job.clone());
                }
            }
        }
        None
    }

    /// Publish the worker's final copy of a job.
    pub(crate) fn publish(&self, job: Job) {
        if let Some(slot) = self.lock().jobs.get_mut(&job.id) {
            *slot = job;
        }
    }
}

/// Accepts jobs and runs them one at a time, oldest first.
///
/// Must be used from within a Tokio runtime. Status changes are delivered on
/// the [`StatusReceiver`] returned by [`QueueManager::new`].
pub struct QueueManager {
    shared: Arc<Shared>,
    runner: Arc<dyn JobRunner>,
    config: QueueConfig,
    download_dir: PathBuf,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl QueueManager {
    pub fn new(
        runner: Arc<dyn JobRunner>,
        config: QueueConfig,
        download_dir: impl Into<PathBuf>,
    ) -> (Self, StatusReceiver) {
        let (reporter, receiver) = StatusReporter::channel();
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                next_id: 1,
                ..Default::default()
            }),
            wakeup: Notify::new(),
            shutdown: AtomicBool::new(false),
            running: watch::channel(false).0,
            reporter,
        });

        let manager = Self {
            shared,
            runner,
            config,
            download_dir: download_dir.into(),
            worker: Mutex::new(None),
        };
        (manager, receiver)
    }

    /// Queue a download of `url` into a file named after `output`.
    ///
    /// Starts the worker if it is not running.
    pub fn submit(&self, url: impl Into<String>, output: &str) -> Job {
        let job = {
            let mut state = self.shared.lock();
            let id = JobId(state.next_id);
            state.next_id += 1;

            let job = Job::new(id, url, output, &self.download_dir);
            state.jobs.insert(id, job.clone());
            state.pending.push_back(id);
            job
        };

        tracing::info!("Queued job {} -> {}", job.id, job.output_path().display());
        self.shared.reporter.report(StatusEvent::Submitted(job.clone()));
        self.shared.wakeup.notify_one();
        self.ensure_worker();

        job
    }

    /// Remove the job at `index` in [`QueueManager::jobs`] order.
    ///
    /// Only pending jobs can be removed; the check and the removal happen
    /// under one lock, so a job cannot be claimed in between.
    pub fn remove(&self, index: usize) -> bool {
        let removed = {
            let mut state = self.shared.lock();
            let Some((&id, job)) = state.jobs.iter().nth(index) else {
                return false;
            };
            if job.status != JobStatus::Pending {
                return false;
            }
            state.jobs.remove(&id);
            state.pending.retain(|pending| *pending != id);
            id
        };

        tracing::info!("Removed job {}", removed);
        self.shared
            .reporter
            .report(StatusEvent::Removed { job_id: removed });
        true
    }

    /// Drop completed and failed jobs from the list. Returns how many.
    pub fn clear_finished(&self) -> usize {
        let mut state = self.shared.lock();
        let before = state.jobs.len();
        state.jobs.retain(|_, job| !job.status.is_terminal());
        before - state.jobs.len()
    }

    /// Ask the worker to exit once the current job (if any) is done.
    ///
    /// Waits up to the configured stop timeout and returns whether the
    /// worker exited in time. Pending jobs stay queued, including jobs
    /// submitted while the stop is in progress.
    pub async fn stop(&self) -> bool {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.wakeup.notify_one();

        let mut running = self.shared.running.subscribe();
        let exited = tokio::time::timeout(
            self.config.stop_timeout(),
            running.wait_for(|alive| !*alive),
        )
        .await
        .is_ok();

        if !exited {
            tracing::warn!("Queue worker still busy after stop request");
        }
        exited
    }

    /// Snapshot of every visible job, in submission order.
    pub fn jobs(&self) -> Vec<Job> {
        self.shared.lock().jobs.values().cloned().collect()
    }

    pub fn job(&self, id: JobId) -> Option<Job> {
        self.shared.lock().jobs.get(&id).cloned()
    }

    pub fn counts(&self) -> StatusCounts {
        let state = self.shared.lock();
        let mut counts = StatusCounts::default();
        for job in state.jobs.values() {
            match job.status {
                JobStatus::Pending => counts.pending += 1,
                JobStatus::InProgress => counts.active += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// No job is pending or running.
    pub fn is_idle(&self) -> bool {
        let counts = self.counts();
        counts.pending == 0 && counts.active == 0
    }

    pub fn is_worker_running(&self) -> bool {
        let slot = self.worker_slot();
        self.worker_alive(&slot)
    }

    fn worker_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A worker is alive until its loop exits, even while it is stopping.
    fn worker_alive(&self, slot: &Option<JoinHandle<()>>) -> bool {
        let running = *self.shared.running.borrow();
        running && slot.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Start a worker unless one is alive.
    ///
    /// A worker that is winding down after `stop` is left alone; jobs
    /// submitted meanwhile wait for the next start.
    fn ensure_worker(&self) {
        let mut slot = self.worker_slot();
        if self.worker_alive(&slot) {
            return;
        }

        self.shared.shutdown.store(false, Ordering::SeqCst);
        self.shared.running.send_replace(true);

        tracing::debug!("Starting queue worker");
        *slot = Some(tokio::spawn(run_worker(
            Arc::clone(&self.shared),
            Arc::clone(&self.runner),
            self.config.clone(),
        )));
    }
}

impl Drop for QueueManager {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.wakeup.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::Semaphore;
    use tokio::time::timeout;

    /// Completes every job; urls containing `slow` wait for a permit,
    /// `panic` panics and `noop` returns without a result.
    struct FakeRunner {
        gate: Semaphore,
        ran: Mutex<Vec<String>>,
        running: AtomicUsize,
        max_running: AtomicUsize,
    }

    impl FakeRunner {
        fn new() -> Self {
            Self {
                gate: Semaphore::new(0),
                ran: Mutex::new(Vec::new()),
                running: AtomicUsize::new(0),
                max_running: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl JobRunner for FakeRunner {
        async fn run(&self, job: &mut Job, reporter: &StatusReporter) {
            job.mark_in_progress();
            self.ran.lock().unwrap().push(job.source_url.clone());
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);

            if job.source_url.contains("slow") {
                self.gate.acquire().await.unwrap().forget();
            }
            self.running.fetch_sub(1, Ordering::SeqCst);
            if job.source_url.contains("panic") {
                panic!("runner blew up");
            }
            if job.source_url.contains("noop") {
                return;
            }

            reporter.progress(job.id, "working");
            job.complete("done");
        }
    }

    fn fast_config() -> QueueConfig {
        QueueConfig {
            poll_interval_ms: 50,
            idle_ms: 10,
            stop_timeout_seconds: 1,
        }
    }

    fn queue() -> (QueueManager, StatusReceiver, Arc<FakeRunner>) {
        let runner = Arc::new(FakeRunner::new());
        let (manager, rx) = QueueManager::new(runner.clone(), fast_config(), "/downloads");
        (manager, rx, runner)
    }

    async fn next_event(rx: &mut StatusReceiver) -> StatusEvent {
        timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("status channel closed")
    }

    async fn wait_finished(rx: &mut StatusReceiver, n: usize) -> Vec<Job> {
        let mut finished = Vec::new();
        while finished.len() < n {
            if let StatusEvent::Finished(job) = next_event(rx).await {
                finished.push(job);
            }
        }
        finished
    }

    async fn wait_claimed(rx: &mut StatusReceiver, id: JobId) {
        loop {
            if let StatusEvent::Claimed(job) = next_event(rx).await {
                if job.id == id {
                    return;
                }
            }
        }
    }

    #[tokio::test]
    async fn test_jobs_run_in_submission_order() {
        let (manager, mut rx, runner) = queue();

        let first = manager.submit("https://example.com/1", "one");
        manager.submit("https://example.com/2", "two");
        manager.submit("https://example.com/3", "");

        let finished = wait_finished(&mut rx, 3).await;
        let ids: Vec<_> = finished.iter().map(|j| j.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(
            *runner.ran.lock().unwrap(),
            vec![
                "https://example.com/1",
                "https://example.com/2",
                "https://example.com/3"
            ]
        );

        assert_eq!(first.id, JobId(1));
        assert_eq!(manager.job(first.id).unwrap().status, JobStatus::Completed);
        assert_eq!(manager.counts().completed, 3);
        assert!(manager.is_idle());
        assert_eq!(manager.jobs()[2].output_name(), "3.pdf");
    }

    #[tokio::test]
    async fn test_submitted_event_precedes_claim() {
        let (manager, mut rx, _runner) = queue();
        let job = manager.submit("https://example.com/a", "a");

        match next_event(&mut rx).await {
            StatusEvent::Submitted(submitted) => {
                assert_eq!(submitted.id, job.id);
                assert_eq!(submitted.status, JobStatus::Pending);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        wait_finished(&mut rx, 1).await;
    }

    #[tokio::test]
    async fn test_remove_only_pending() {
        let (manager, mut rx, runner) = queue();

        let slow = manager.submit("https://example.com/slow", "slow");
        manager.submit("https://example.com/next", "next");
        wait_claimed(&mut rx, slow.id).await;

        assert!(!manager.remove(0), "running job must not be removable");
        assert!(!manager.remove(5));
        assert!(manager.remove(1));
        assert_eq!(manager.jobs().len(), 1);

        runner.gate.add_permits(1);
        let finished = wait_finished(&mut rx, 1).await;
        assert_eq!(finished[0].id, slow.id);

        assert!(!manager.remove(0), "finished job must not be removable");
        assert_eq!(*runner.ran.lock().unwrap(), vec!["https://example.com/slow"]);

        assert_eq!(manager.clear_finished(), 1);
        assert!(manager.jobs().is_empty());
    }

    #[tokio::test]
    async fn test_panicking_runner_fails_job_and_worker_survives() {
        let (manager, mut rx, _runner) = queue();

        manager.submit("https://example.com/panic", "bad");
        manager.submit("https://example.com/noop", "silent");
        manager.submit("https://example.com/ok", "good");

        let finished = wait_finished(&mut rx, 3).await;
        assert_eq!(finished[0].status, JobStatus::Failed);
        assert!(finished[0].message.starts_with("Error"));
        assert_eq!(finished[1].status, JobStatus::Failed);
        assert_eq!(finished[2].status, JobStatus::Completed);

        let counts = manager.counts();
        assert_eq!((counts.completed, counts.failed), (1, 2));
    }

    #[tokio::test]
    async fn test_stop_lets_current_job_finish() {
        let (manager, mut rx, runner) = queue();

        let slow = manager.submit("https://example.com/slow", "slow");
        let waiting = manager.submit("https://example.com/later", "later");
        wait_claimed(&mut rx, slow.id).await;

        let gate = runner.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            gate.gate.add_permits(1);
        });

        assert!(manager.stop().await);
        assert!(!manager.is_worker_running());
        assert_eq!(manager.job(slow.id).unwrap().status, JobStatus::Completed);
        assert_eq!(manager.job(waiting.id).unwrap().status, JobStatus::Pending);
        assert_eq!(manager.counts().pending, 1);

        // Submitting again restarts the worker and drains what was left.
        manager.submit("https://example.com/after", "after");
        let finished = wait_finished(&mut rx, 3).await;
        let ids: Vec<_> = finished.iter().map(|j| j.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_stop_times_out_on_busy_worker() {
        let (manager, mut rx, runner) = queue();

        let slow = manager.submit("https://example.com/slow", "slow");
        wait_claimed(&mut rx, slow.id).await;

        assert!(!manager.stop().await);
        assert!(manager.is_worker_running());

        runner.gate.add_permits(1);
        loop {
            if let StatusEvent::WorkerStopped = next_event(&mut rx).await {
                break;
            }
        }
        assert_eq!(manager.job(slow.id).unwrap().status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_stop_without_worker() {
        let (manager, _rx, _runner) = queue();
        assert!(manager.stop().await);
        assert!(manager.is_idle());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_submit_during_stop_keeps_single_worker() {
        let (manager, mut rx, runner) = queue();
        let manager = Arc::new(manager);

        let first = manager.submit("https://example.com/slow-a", "a");
        wait_claimed(&mut rx, first.id).await;

        let stopping = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.stop().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let second = manager.submit("https://example.com/slow-b", "b");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(manager.counts().active, 1);
        assert_eq!(manager.job(second.id).unwrap().status, JobStatus::Pending);

        runner.gate.add_permits(1);
        assert!(stopping.await.unwrap());
        assert!(!manager.is_worker_running());
        assert_eq!(manager.job(first.id).unwrap().status, JobStatus::Completed);
        assert_eq!(manager.job(second.id).unwrap().status, JobStatus::Pending);

        // The next submit starts one fresh worker for what was left.
        runner.gate.add_permits(1);
        manager.submit("https://example.com/after", "c");
        let finished = wait_finished(&mut rx, 3).await;
        let ids: Vec<_> = finished.iter().map(|j| j.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(runner.max_running.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submits_start_in_fifo_order() {
        let (manager, mut rx, runner) = queue();
        let manager = Arc::new(manager);

        let slow = manager.submit("https://example.com/slow", "slow");
        wait_claimed(&mut rx, slow.id).await;

        let submitters: Vec<_> = (0..8)
            .map(|i| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move {
                    manager.submit(format!("https://example.com/book-{}", i), "").id
                })
            })
            .collect();
        let mut submitted = Vec::new();
        for task in submitters {
            submitted.push(task.await.unwrap());
        }
        submitted.sort();
        assert_eq!(manager.counts().active, 1);

        runner.gate.add_permits(1);

        let mut claimed = Vec::new();
        let mut finished = 0;
        while finished < submitted.len() + 1 {
            match next_event(&mut rx).await {
                StatusEvent::Claimed(job) => {
                    assert!(manager.counts().active <= 1);
                    claimed.push(job.id);
                }
                StatusEvent::Finished(_) => finished += 1,
                _ => {}
            }
        }

        assert_eq!(claimed, submitted);
        assert_eq!(runner.max_running.load(Ordering::SeqCst), 1);
        assert_eq!(manager.counts().completed, 9);
    }
}
