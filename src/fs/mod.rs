//! Filesystem module.
//!
//! Provides:
//! - Output name sanitation
//! - Fragment and output path management

pub mod naming;
pub mod paths;

pub use naming::{
    default_output_name, fragment_file_name, numbered_sibling, sanitize_output_name,
};
pub use paths::{default_temp_directory, ensure_dir, get_fragment_path, get_output_path};
