//! Configuration module for the content-select-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Configuration validation

pub mod loader;
pub mod validation;

pub use loader::{Config, HttpConfig, OptionsConfig, QueueConfig};
pub use validation::{validate_config, validate_source_url};
