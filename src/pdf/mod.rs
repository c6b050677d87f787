//! PDF module.
//!
//! Provides:
//! - Opening fragments and counting their pages
//! - Concatenating documents into one output file

pub mod document;

pub use document::{MergedDocument, PdfDocument};
