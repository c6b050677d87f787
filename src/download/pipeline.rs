//! The download pipeline: discovery, extraction, download, merge, cleanup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::time::sleep;

use crate::api::SiteClient;
use crate::config::Config;
use crate::download::fragment::{download_chapter, ChapterOutcome, Fragment};
use crate::download::merge::{cleanup, merge_fragments, run_blocking};
use crate::download::state::RunState;
use crate::error::{Error, Result};
use crate::fs::numbered_sibling;
use crate::job::{Job, JobId};
use crate::page::{book_links, extract_document_id, outline_chapter_ids, print_list_chapter_ids};
use crate::queue::{JobRunner, StatusReporter};

/// Drives one job from its source URL to a merged PDF.
///
/// All steps are sequential; chapters are fetched one at a time.
#[derive(Debug, Clone)]
pub struct DownloadPipeline {
    client: SiteClient,
    fragment_base_url: String,
    temp_dir: PathBuf,
    chapter_delay_ms: (u64, u64),
}

impl DownloadPipeline {
    pub fn new(client: SiteClient, config: &Config) -> Self {
        Self {
            client,
            fragment_base_url: config.http.fragment_base_url.clone(),
            temp_dir: config.temp_directory(),
            chapter_delay_ms: (
                config.options.chapter_delay_min_ms,
                config.options.chapter_delay_max_ms,
            ),
        }
    }

    /// Run a job to a terminal state. Errors end up in the job's message.
    pub async fn process_job(&self, job: &mut Job, reporter: &StatusReporter) {
        job.mark_in_progress();
        tracing::info!("Starting job {}: {}", job.id, job.source_url);

        match self.process(job, reporter).await {
            Ok(state) => {
                let message = state.summary();
                tracing::info!("Job {} completed: {}", job.id, message);
                job.complete(message);
            }
            Err(e) => {
                tracing::error!("Job {} failed ({}): {}", job.id, e.kind(), e);
                job.fail(format!("Error: {}", e));
            }
        }
    }

    async fn process(&self, job: &mut Job, reporter: &StatusReporter) -> Result<RunState> {
        reporter.progress(job.id, "Searching for book URLs");
        let book_urls = self.discover_book_urls(&job.source_url).await?;

        let mut state = RunState::default();

        // Any book that fails a stage fails the whole job.
        for (i, book_url) in book_urls.iter().enumerate() {
            job.resolved_url = Some(book_url.clone());
            let output = match i {
                0 => job.output_path().to_path_buf(),
                _ => numbered_sibling(job.output_path(), i + 1),
            };

            let pages = self
                .process_book(job.id, book_url, &output, reporter, &mut state)
                .await?;
            state.record_output(output, pages);
        }

        if state.outputs.is_empty() {
            return Err(Error::EmptyResult("no fragments found".to_string()));
        }

        Ok(state)
    }

    async fn process_book(
        &self,
        job_id: JobId,
        book_url: &str,
        output: &Path,
        reporter: &StatusReporter,
        state: &mut RunState,
    ) -> Result<usize> {
        reporter.progress(job_id, "Extracting document ID");
        let document_id = extract_document_id(book_url)?;

        reporter.progress(job_id, "Extracting chapter IDs");
        let chapter_ids = self.extract_chapter_ids(book_url).await?;
        let total = chapter_ids.len();
        state.chapters_total += total as u64;

        let mut written: Vec<Fragment> = Vec::new();
        let mut valid: Vec<Fragment> = Vec::new();

        for (i, chapter_id) in chapter_ids.iter().enumerate() {
            let index = i + 1;
            if i > 0 {
                self.pause_between_chapters().await;
            }

            reporter.progress(
                job_id,
                format!("Downloading chapter {}/{}: {}", index, total, chapter_id),
            );

            let outcome = self
                .download_chapter(job_id, &document_id, chapter_id, index)
                .await;
            if let Some(fragment) = outcome.written() {
                written.push(fragment.clone());
            }

            match outcome {
                ChapterOutcome::Valid(fragment) => {
                    state.increment_valid();
                    valid.push(fragment);
                }
                ChapterOutcome::Invalid { fragment, reason } => {
                    state.increment_invalid();
                    tracing::warn!("Chapter {} ({}) is not usable: {}", index, fragment.chapter_id, reason);
                }
                ChapterOutcome::Skipped(reason) => {
                    state.increment_skipped();
                    tracing::warn!("Skipping chapter {} ({}): {}", index, chapter_id, reason);
                }
            }
        }

        let result = if valid.is_empty() {
            Err(Error::EmptyResult("no fragments found".to_string()))
        } else {
            reporter.progress(job_id, format!("Merging {} fragments", valid.len()));
            let output = output.to_path_buf();
            run_blocking(move || merge_fragments(&valid, &output)).await
        };

        let removed = run_blocking(move || Ok(cleanup(&written)))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Fragment cleanup did not finish: {}", e);
                0
            });
        state.files_removed += removed as u64;

        result
    }

    /// Book URLs linked from the root page; the root itself if it links none.
    pub async fn discover_book_urls(&self, root_url: &str) -> Result<Vec<String>> {
        tracing::info!("Searching for book URLs at {}", root_url);

        let html = self.client.fetch_page(root_url).await?;
        let links = book_links(&html, root_url)?;

        if links.is_empty() {
            tracing::debug!("No book links found, treating {} as a book URL", root_url);
            return Ok(vec![root_url.to_string()]);
        }

        tracing::info!("Found {} book URLs", links.len());
        Ok(links)
    }

    /// Chapter IDs of a book, in reading order.
    ///
    /// Reads the print list first and falls back to the outline.
    pub async fn extract_chapter_ids(&self, book_url: &str) -> Result<Vec<String>> {
        tracing::info!("Extracting chapter IDs from {}", book_url);

        let html = self.client.fetch_page(book_url).await?;

        let mut chapters = print_list_chapter_ids(&html)?;
        if chapters.is_empty() {
            tracing::debug!("Print list empty, scanning outline");
            chapters = outline_chapter_ids(&html)?;
        }

        if chapters.is_empty() {
            return Err(Error::EmptyResult(format!(
                "could not find chapter IDs at {}",
                book_url
            )));
        }

        tracing::info!("Found {} chapters", chapters.len());
        Ok(chapters)
    }

    /// Download and validate one chapter.
    pub async fn download_chapter(
        &self,
        job_id: JobId,
        document_id: &str,
        chapter_id: &str,
        index: usize,
    ) -> ChapterOutcome {
        download_chapter(
            &self.client,
            &self.fragment_base_url,
            &self.temp_dir,
            job_id,
            document_id,
            chapter_id,
            index,
        )
        .await
    }

    async fn pause_between_chapters(&self) {
        let (min, max) = self.chapter_delay_ms;
        if max > min {
            let delay_ms = rand::thread_rng().gen_range(min..max);
            sleep(Duration::from_millis(delay_ms)).await;
        }
    }
}

#[async_trait]
impl JobRunner for DownloadPipeline {
    async fn run(&self, job: &mut Job, reporter: &StatusReporter) {
        self.process_job(job, reporter).await;
    }
}
