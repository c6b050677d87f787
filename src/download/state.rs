//! Per-job download state tracking.

use std::path::PathBuf;

/// Tally of one job's run across all of its books.
#[derive(Debug, Default)]
pub struct RunState {
    // Chapter statistics
    pub chapters_total: u64,
    pub fragments_valid: u64,
    pub fragments_invalid: u64,
    pub chapters_skipped: u64,
    pub files_removed: u64,

    /// Merged documents written, with their page counts.
    pub outputs: Vec<(PathBuf, usize)>,
}

impl RunState {
    pub fn increment_valid(&mut self) {
        self.fragments_valid += 1;
    }

    pub fn increment_invalid(&mut self) {
        self.fragments_invalid += 1;
    }

    pub fn increment_skipped(&mut self) {
        self.chapters_skipped += 1;
    }

    pub fn record_output(&mut self, path: PathBuf, pages: usize) {
        self.outputs.push((path, pages));
    }

    /// Total pages across all merged documents.
    pub fn total_pages(&self) -> usize {
        self.outputs.iter().map(|(_, pages)| pages).sum()
    }

    /// Chapters that did not make it into a merged document.
    pub fn chapters_dropped(&self) -> u64 {
        self.fragments_invalid + self.chapters_skipped
    }

    /// Completion message naming every written file.
    pub fn summary(&self) -> String {
        let paths: Vec<String> = self
            .outputs
            .iter()
            .map(|(path, _)| path.display().to_string())
            .collect();

        let mut message = format!("Saved as {} ({} pages)", paths.join(", "), self.total_pages());
        if self.chapters_dropped() > 0 {
            message.push_str(&format!(
                ", {} of {} chapters skipped",
                self.chapters_dropped(),
                self.chapters_total
            ));
        }
        message
    }
}
