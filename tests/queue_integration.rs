//! Integration tests for the queue driving the real download pipeline.

mod support;

use std::sync::Arc;
use std::time::Duration;

use content_select_downloader::download::DownloadPipeline;
use content_select_downloader::{
    Job, JobStatus, QueueManager, SiteClient, StatusEvent, StatusReceiver,
};
use tempfile::TempDir;
use tokio::time::timeout;
use wiremock::MockServer;

use support::*;

async fn next_event(events: &mut StatusReceiver) -> StatusEvent {
    timeout(Duration::from_secs(10), events.recv())
        .await
        .expect("timed out waiting for a status event")
        .expect("status channel closed")
}

async fn collect_finished(events: &mut StatusReceiver, n: usize) -> (Vec<Job>, Vec<Job>) {
    let mut claimed = Vec::new();
    let mut finished = Vec::new();
    while finished.len() < n {
        match next_event(events).await {
            StatusEvent::Claimed(job) => claimed.push(job),
            StatusEvent::Finished(job) => finished.push(job),
            _ => {}
        }
    }
    (claimed, finished)
}

#[tokio::test]
async fn test_queue_runs_jobs_in_order_and_isolates_failures() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("failed to create temp dir");
    let config = test_config(&server, dir.path());

    mount_page(&server, "/moz_viewer/doc-a/", print_list_page(&["a1", "a2"])).await;
    mount_page(&server, "/moz_viewer/doc-b/", "<html></html>".to_string()).await;
    mount_page(&server, "/moz_viewer/doc-c/", print_list_page(&["c1"])).await;
    mount_fragment(&server, "doc-a", "a1", pdf_response(&[1])).await;
    mount_fragment(&server, "doc-a", "a2", pdf_response(&[2])).await;
    mount_fragment(&server, "doc-c", "c1", pdf_response(&[3])).await;

    let client = SiteClient::new(&config.http).expect("client should build");
    let pipeline = DownloadPipeline::new(client, &config);
    let (queue, mut events) = QueueManager::new(
        Arc::new(pipeline),
        config.queue.clone(),
        config.download_directory(),
    );

    let a = queue.submit(format!("{}/moz_viewer/doc-a/", server.uri()), "first");
    let b = queue.submit(format!("{}/moz_viewer/doc-b/", server.uri()), "second");
    let c = queue.submit(format!("{}/moz_viewer/doc-c/", server.uri()), "");

    let (claimed, finished) = collect_finished(&mut events, 3).await;

    let claim_order: Vec<_> = claimed.iter().map(|j| j.id).collect();
    assert_eq!(claim_order, vec![a.id, b.id, c.id]);
    assert!(claimed.iter().all(|j| j.status == JobStatus::InProgress));

    let finish_order: Vec<_> = finished.iter().map(|j| j.id).collect();
    assert_eq!(finish_order, vec![a.id, b.id, c.id]);

    assert_eq!(finished[0].status, JobStatus::Completed);
    assert_eq!(finished[1].status, JobStatus::Failed);
    assert_eq!(finished[2].status, JobStatus::Completed);

    assert_eq!(page_widths(finished[0].output_path()), vec![1, 2]);
    assert_eq!(finished[2].output_name(), "doc_c.pdf");
    assert!(!finished[1].output_path().exists());

    let counts = queue.counts();
    assert_eq!((counts.completed, counts.failed, counts.pending), (2, 1, 0));
    assert!(queue.is_idle());
    assert!(files_in(&config.temp_directory()).is_empty());

    assert!(queue.stop().await);
}

#[tokio::test]
async fn test_removed_job_never_runs() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("failed to create temp dir");
    let config = test_config(&server, dir.path());

    mount_page(&server, "/moz_viewer/doc-a/", print_list_page(&["a1"])).await;
    mount_fragment(&server, "doc-a", "a1", pdf_response(&[1])).await;

    let client = SiteClient::new(&config.http).expect("client should build");
    let pipeline = DownloadPipeline::new(client, &config);
    let (queue, mut events) = QueueManager::new(
        Arc::new(pipeline),
        config.queue.clone(),
        config.download_directory(),
    );

    let kept = queue.submit(format!("{}/moz_viewer/doc-a/", server.uri()), "kept");
    let dropped = queue.submit(format!("{}/moz_viewer/doc-z/", server.uri()), "dropped");

    // The test runtime is single-threaded, so the worker has not claimed
    // anything yet.
    let index = queue
        .jobs()
        .iter()
        .position(|j| j.id == dropped.id)
        .expect("job should be listed");
    assert!(queue.remove(index));
    assert!(queue.job(dropped.id).is_none());

    let (claimed, finished) = collect_finished(&mut events, 1).await;
    assert_eq!(finished[0].id, kept.id);
    assert_eq!(finished[0].status, JobStatus::Completed, "message: {}", finished[0].message);
    assert!(claimed.iter().all(|j| j.id != dropped.id));
    assert!(queue.is_idle());

    assert!(queue.stop().await);
}
