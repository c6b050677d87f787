//! Platform HTTP access.
//!
//! This module provides:
//! - Page fetching for discovery and chapter enumeration
//! - Fragment fetching with status and content-type checks

pub mod client;

pub use client::{SiteClient, PDF_CONTENT_TYPE};
