//! Fragment merging and cleanup.

use std::path::Path;

use crate::download::fragment::Fragment;
use crate::error::{Error, Result};
use crate::pdf::{MergedDocument, PdfDocument};

/// Run blocking PDF or filesystem work on the blocking pool so the async
/// worker stays responsive.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
}

/// Merge fragments, in the given order, into `output`.
///
/// Each fragment is opened again before it is appended; one that no longer
/// opens or has no pages is left out. If no pages remain, nothing is written
/// and `Error::EmptyResult` is returned. Returns the number of pages written.
pub fn merge_fragments(fragments: &[Fragment], output: &Path) -> Result<usize> {
    tracing::info!("Merging {} fragments", fragments.len());

    let mut merged = MergedDocument::new();

    for fragment in fragments {
        match PdfDocument::open(&fragment.path) {
            Ok(document) if document.page_count() > 0 => {
                let added = merged.append(&document);
                tracing::debug!(
                    "Added {} ({} pages)",
                    fragment.path.display(),
                    added
                );
            }
            Ok(_) => {
                tracing::warn!("Skipping empty fragment: {}", fragment.path.display());
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable fragment {}: {}", fragment.path.display(), e);
            }
        }
    }

    if merged.page_count() == 0 {
        return Err(Error::EmptyResult("no pages to save".to_string()));
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::filesystem(parent, e))?;
    }

    let pages = merged.save(output)?;
    tracing::info!("Created {} with {} pages", output.display(), pages);

    Ok(pages)
}

/// Delete every fragment file. Failures are logged and otherwise ignored.
///
/// Returns the number of files removed.
pub fn cleanup(fragments: &[Fragment]) -> usize {
    let mut removed = 0;

    for fragment in fragments {
        if !fragment.path.exists() {
            continue;
        }
        match std::fs::remove_file(&fragment.path) {
            Ok(()) => removed += 1,
            Err(e) => {
                tracing::warn!("Could not delete {}: {}", fragment.path.display(), e);
            }
        }
    }

    tracing::debug!("Cleanup removed {} of {} fragments", removed, fragments.len());
    removed
}
