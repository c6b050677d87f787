//! Chapter fragment downloading and validation.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::api::SiteClient;
use crate::download::merge::run_blocking;
use crate::error::{Error, Result};
use crate::fs::{ensure_dir, get_fragment_path};
use crate::job::JobId;
use crate::pdf::PdfDocument;

/// One chapter's PDF, written to a temporary file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub job_id: JobId,
    /// 1-based position of the chapter in the book.
    pub index: usize,
    pub chapter_id: String,
    pub path: PathBuf,
    /// Page count found during validation; 0 if validation failed.
    pub page_count: usize,
}

/// Result of downloading one chapter.
#[derive(Debug)]
pub enum ChapterOutcome {
    /// Written and validated; goes into the merge.
    Valid(Fragment),
    /// Written but not a usable PDF; only needs cleaning up.
    Invalid { fragment: Fragment, reason: Error },
    /// Nothing was written.
    Skipped(Error),
}

impl ChapterOutcome {
    /// The file this outcome left on disk, if any.
    pub fn written(&self) -> Option<&Fragment> {
        match self {
            ChapterOutcome::Valid(fragment) | ChapterOutcome::Invalid { fragment, .. } => {
                Some(fragment)
            }
            ChapterOutcome::Skipped(_) => None,
        }
    }
}

/// Build the URL a chapter fragment is served from.
pub fn fragment_url(base_url: &str, document_id: &str, chapter_id: &str) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        document_id,
        chapter_id
    )
}

/// Open a fragment and require at least one page.
pub fn validate_fragment(path: &Path) -> Result<usize> {
    let document = PdfDocument::open(path)
        .map_err(|e| Error::Validation(format!("{} is not a valid PDF: {}", path.display(), e)))?;

    match document.page_count() {
        0 => Err(Error::Validation(format!("{} has no pages", path.display()))),
        pages => Ok(pages),
    }
}

/// Download one chapter into `temp_dir` and validate it.
///
/// Never fails: problems are reported through the returned outcome.
pub async fn download_chapter(
    client: &SiteClient,
    base_url: &str,
    temp_dir: &Path,
    job_id: JobId,
    document_id: &str,
    chapter_id: &str,
    index: usize,
) -> ChapterOutcome {
    let url = fragment_url(base_url, document_id, chapter_id);
    let path = get_fragment_path(temp_dir, job_id.0, index, document_id);

    if let Err(e) = fetch_to_file(client, &url, temp_dir, &path).await {
        return ChapterOutcome::Skipped(e);
    }

    let fragment = Fragment {
        job_id,
        index,
        chapter_id: chapter_id.to_string(),
        path,
        page_count: 0,
    };

    let path = fragment.path.clone();
    match run_blocking(move || validate_fragment(&path)).await {
        Ok(page_count) => ChapterOutcome::Valid(Fragment {
            page_count,
            ..fragment
        }),
        Err(reason) => ChapterOutcome::Invalid { fragment, reason },
    }
}

/// Stream a fragment response to disk. A partially written file is removed.
async fn fetch_to_file(client: &SiteClient, url: &str, temp_dir: &Path, path: &Path) -> Result<()> {
    let response = client.fetch_fragment(url).await?;

    ensure_dir(temp_dir).await?;

    let result = write_stream(response, path).await;
    if result.is_err() {
        let _ = tokio::fs::remove_file(path).await;
    }
    result
}

async fn write_stream(response: reqwest::Response, path: &Path) -> Result<()> {
    let mut file = File::create(path)
        .await
        .map_err(|e| Error::filesystem(path, e))?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::Connectivity(format!("Stream error: {}", e)))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::filesystem(path, e))?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| Error::filesystem(path, e))?;

    tracing::debug!("Wrote {} bytes to {}", written, path.display());
    Ok(())
}
