//! Content-Select Downloader - queue-driven book downloads as single PDFs.
//!
//! A book on the platform is served as one PDF fragment per chapter. This
//! library discovers the books behind a URL, downloads every chapter,
//! validates each fragment, and merges the usable ones into one document.
//!
//! # Features
//!
//! - FIFO job queue with a single background worker
//! - Listing pages that link to several books
//! - Print-list and outline chapter discovery
//! - Lenient merging that skips unusable chapters
//! - Status events over a channel for any front end
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use content_select_downloader::{Config, DownloadPipeline, QueueManager, SiteClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let client = SiteClient::new(&config.http)?;
//!     let pipeline = DownloadPipeline::new(client, &config);
//!
//!     let (queue, mut events) =
//!         QueueManager::new(Arc::new(pipeline), config.queue.clone(), config.download_directory());
//!     queue.submit("https://content-select.com/de/portal/media/view/1234", "my_book");
//!
//!     while let Some(event) = events.recv().await {
//!         println!("{:?}", event);
//!         if queue.is_idle() {
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod job;
pub mod output;
pub mod page;
pub mod pdf;
pub mod queue;

// Re-exports for convenience
pub use api::SiteClient;
pub use config::Config;
pub use download::{DownloadPipeline, RunState};
pub use error::{Error, ErrorKind, Result};
pub use job::{Job, JobId, JobStatus};
pub use queue::{JobRunner, QueueManager, StatusCounts, StatusEvent, StatusReceiver, StatusReporter};
