//! Page parsing utilities.
//!
//! Everything here is synchronous and works on HTML text, so parsed documents
//! never live across an `.await`.

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{Error, Result};

/// Anchors of the entries on a collection listing page.
pub const BOOK_LINK_SELECTOR: &str = ".book-item a";

/// Anchors of the dedicated print list on a book page.
pub const PRINT_LIST_SELECTOR: &str = "#printList a";

/// Attribute of a print-list anchor holding the chapter ID.
pub const CHAPTER_ID_ATTR: &str = "data-chapter-id";

/// Anchors of the outline sidebar on a book page.
pub const OUTLINE_SELECTOR: &str = "div.outlineItem a";

const DOCUMENT_ID_PATTERN: &str = r"moz_viewer/([a-z0-9\-]+)/";
const CHAPTER_FRAGMENT_PATTERN: &str = r"#chapter=([a-z0-9]+)";

/// Select elements and collect one attribute, in document order.
pub fn select_attr(html: &str, selector: &str, attr: &str) -> Result<Vec<String>> {
    let selector = Selector::parse(selector)
        .map_err(|e| Error::Extraction(format!("Invalid selector '{}': {}", selector, e)))?;

    let document = Html::parse_document(html);
    let values = document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .map(str::to_string)
        .collect();

    Ok(values)
}

/// Book URLs linked from a collection page, resolved against `page_url`.
///
/// Links that cannot be resolved are skipped.
pub fn book_links(html: &str, page_url: &str) -> Result<Vec<String>> {
    let base = Url::parse(page_url)?;

    let links = select_attr(html, BOOK_LINK_SELECTOR, "href")?
        .into_iter()
        .filter_map(|href| match base.join(&href) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                tracing::debug!("Ignoring book link '{}': {}", href, e);
                None
            }
        })
        .collect();

    Ok(links)
}

/// Chapter IDs from the print list, in page order.
pub fn print_list_chapter_ids(html: &str) -> Result<Vec<String>> {
    let ids = select_attr(html, PRINT_LIST_SELECTOR, CHAPTER_ID_ATTR)?
        .into_iter()
        .filter(|id| !id.trim().is_empty())
        .collect();
    Ok(ids)
}

/// Chapter IDs from `#chapter=<id>` fragments of outline links, in page order.
pub fn outline_chapter_ids(html: &str) -> Result<Vec<String>> {
    let pattern = compile(CHAPTER_FRAGMENT_PATTERN)?;

    let ids = select_attr(html, OUTLINE_SELECTOR, "href")?
        .iter()
        .filter_map(|href| capture(&pattern, href))
        .collect();
    Ok(ids)
}

/// Extract the document ID from a book URL (`.../moz_viewer/<id>/...`).
pub fn extract_document_id(book_url: &str) -> Result<String> {
    let pattern = compile(DOCUMENT_ID_PATTERN)?;

    capture(&pattern, book_url).ok_or_else(|| {
        Error::Extraction(format!("Could not extract a document ID from {}", book_url))
    })
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Extraction(format!("Invalid pattern: {}", e)))
}

fn capture(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}
