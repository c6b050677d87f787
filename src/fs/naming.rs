//! Filename generation and manipulation.

use std::path::{Path, PathBuf};

use url::Url;

/// Extension every merged document carries.
pub const PDF_EXTENSION: &str = ".pdf";

/// Sanitize a caller-supplied output name into a PDF filename.
///
/// Characters that are not allowed in Windows filenames (`< > : " / \ | ? *`
/// and control characters) are replaced with `_`, and the result ends with
/// `.pdf` exactly once. Applying it to its own output is a no-op.
pub fn sanitize_output_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let mut stem = sanitized.as_str();
    while let Some(stripped) = strip_pdf_extension(stem) {
        stem = stripped;
    }

    format!("{}{}", stem, PDF_EXTENSION)
}

fn strip_pdf_extension(name: &str) -> Option<&str> {
    let split = name.len().checked_sub(PDF_EXTENSION.len())?;
    if !name.is_char_boundary(split) {
        return None;
    }
    let (stem, ext) = name.split_at(split);
    ext.eq_ignore_ascii_case(PDF_EXTENSION).then_some(stem)
}

/// Derive an output name from a source URL when the caller gave none.
///
/// Uses the last non-empty path segment with `-` replaced by `_`, falling back
/// to `download_<n>`.
pub fn default_output_name(source_url: &str, job_number: u64) -> String {
    Url::parse(source_url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
        })
        .map(|segment| segment.replace('-', "_"))
        .unwrap_or_else(|| format!("download_{}", job_number))
}

/// Name of the temporary file holding one chapter fragment.
///
/// Keyed by job, chapter index, and document ID so fragments never collide
/// across chapters or across jobs that target the same document.
pub fn fragment_file_name(job_id: u64, index: usize, document_id: &str) -> String {
    format!("tmp_{}_{}_{}.pdf", job_id, index, document_id)
}

/// Path for the `n`-th output beside `path`: `book.pdf` becomes `book_2.pdf`.
pub fn numbered_sibling(path: &Path, n: usize) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("download");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("pdf");
    let parent = path.parent().unwrap_or(Path::new("."));

    parent.join(format!("{}_{}.{}", stem, n, ext))
}
