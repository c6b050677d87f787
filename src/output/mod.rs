//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - The active-job spinner
//! - Job lines and the run summary

pub mod console;
pub mod progress;
pub mod stats;

pub use console::{print_banner, print_config_summary, print_error, print_info, print_warning};
pub use progress::create_spinner;
pub use stats::{format_job_line, print_job_line, print_summary};
