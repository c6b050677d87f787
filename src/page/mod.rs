//! Page module.
//!
//! Provides HTML selection for book discovery and chapter enumeration.

pub mod parser;

pub use parser::{
    book_links, extract_document_id, outline_chapter_ids, print_list_chapter_ids, select_attr,
};
