//! Download module for document retrieval.
//!
//! This module provides:
//! - Book discovery and chapter enumeration
//! - Chapter fragment downloading and validation
//! - Fragment merging and cleanup
//! - Per-job run statistics

pub mod fragment;
pub mod merge;
pub mod pipeline;
pub mod state;

pub use fragment::{download_chapter, fragment_url, validate_fragment, ChapterOutcome, Fragment};
pub use merge::{cleanup, merge_fragments};
pub use pipeline::DownloadPipeline;
pub use state::RunState;
