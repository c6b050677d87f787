//! Path and directory management.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{Error, Result};
use crate::fs::naming::{fragment_file_name, sanitize_output_name};

/// Get the output path for a job: the sanitized name inside `directory`.
pub fn get_output_path(directory: &Path, name: &str) -> PathBuf {
    directory.join(sanitize_output_name(name))
}

/// Get the temporary path for one chapter fragment.
pub fn get_fragment_path(
    temp_dir: &Path,
    job_id: u64,
    index: usize,
    document_id: &str,
) -> PathBuf {
    temp_dir.join(fragment_file_name(job_id, index, document_id))
}

/// Default working directory for fragments.
pub fn default_temp_directory() -> PathBuf {
    ProjectDirs::from("com", "content-select", "content-select-downloader")
        .map(|dirs| dirs.cache_dir().join("fragments"))
        .unwrap_or_else(|| std::env::temp_dir().join("content-select-downloader"))
}

/// Ensure a directory exists, creating it if necessary.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| Error::filesystem(path, e))?;
    }
    Ok(())
}
