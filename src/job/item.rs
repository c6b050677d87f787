//! Download job representation.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fs::{default_output_name, get_output_path};
use crate::job::status::JobStatus;

/// Stable job identifier. Allocated in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One request to download a document and merge its chapters.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    /// Queue-assigned identifier.
    pub id: JobId,

    /// URL supplied at submission (collection listing or book page).
    pub source_url: String,

    /// Book URL currently being processed, once discovery has run.
    pub resolved_url: Option<String>,

    /// Sanitized destination of the merged document.
    output_path: PathBuf,

    /// Current lifecycle state.
    pub status: JobStatus,

    /// Detail set when the job completes or fails.
    pub message: String,

    pub submitted_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a pending job writing to `name` inside `directory`.
    ///
    /// An empty `name` is derived from the URL. The output path is fixed here
    /// and cannot be changed afterwards.
    pub fn new(id: JobId, source_url: impl Into<String>, name: &str, directory: &Path) -> Self {
        let source_url = source_url.into();
        let name = match name.trim() {
            "" => default_output_name(&source_url, id.0),
            trimmed => trimmed.to_string(),
        };

        Self {
            id,
            output_path: get_output_path(directory, &name),
            source_url,
            resolved_url: None,
            status: JobStatus::Pending,
            message: String::new(),
            submitted_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Destination of the merged document.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// File name of the merged document, for display.
    pub fn output_name(&self) -> String {
        self.output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn mark_in_progress(&mut self) {
        if self.status != JobStatus::InProgress {
            self.status = JobStatus::InProgress;
            self.started_at = Some(Utc::now());
        }
    }

    pub fn complete(&mut self, message: impl Into<String>) {
        self.finish(JobStatus::Completed, message.into());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.finish(JobStatus::Failed, message.into());
    }

    fn finish(&mut self, status: JobStatus, message: String) {
        self.status = status;
        self.message = message;
        self.finished_at = Some(Utc::now());
    }
}
