//! Loading source documents from disk.
//!
//! PDFs are read page by page (requires the `pdf` feature). Plain text and
//! Markdown files are split into pages on form feeds (`\x0c`), which is what
//! most PDF-to-text converters emit between pages.

use std::path::Path;

use tracing::{debug, warn};

use crate::document::{Document, Page};
use crate::error::{RagError, Result};

const FORM_FEED: char = '\x0c';

fn loader_error(path: &Path, message: impl Into<String>) -> RagError {
    RagError::LoaderError { path: path.display().to_string(), message: message.into() }
}

/// Load `path` into a [`Document`] whose ID is the file stem.
///
/// # Errors
///
/// Returns [`RagError::LoaderError`] if the file is missing or unreadable,
/// has an unsupported extension, or contains no text at all.
pub async fn load_document(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let pages = match extension.as_str() {
        "pdf" => load_pdf_pages(path).await?,
        "txt" | "md" | "markdown" => {
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| loader_error(path, e.to_string()))?;
            split_pages(&text)
        }
        other => {
            return Err(loader_error(
                path,
                format!("unsupported file type '{other}' (expected pdf, txt or md)"),
            ));
        }
    };

    let id = path.file_stem().and_then(|s| s.to_str()).unwrap_or("document").to_string();
    let mut document = Document::new(id, path.display().to_string(), pages);
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        document = document.with_metadata("file_name", name);
    }

    if document.is_blank() {
        return Err(loader_error(path, "no text could be extracted"));
    }
    debug!(path = %path.display(), pages = document.pages.len(), "loaded document");
    Ok(document)
}

/// Split text on form feeds into 1-based pages.
pub fn split_pages(text: &str) -> Vec<Page> {
    text.split(FORM_FEED)
        .enumerate()
        .map(|(i, page)| Page { number: i as u32 + 1, text: page.to_string() })
        .collect()
}

#[cfg(feature = "pdf")]
async fn load_pdf_pages(path: &Path) -> Result<Vec<Page>> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || extract_pdf_pages(&owned))
        .await
        .map_err(|e| loader_error(path, e.to_string()))?
}

#[cfg(feature = "pdf")]
fn extract_pdf_pages(path: &Path) -> Result<Vec<Page>> {
    let document = lopdf::Document::load(path)
        .map_err(|e| loader_error(path, format!("failed to load PDF: {e}")))?;

    collect_pages(path, document.get_pages().into_keys(), |number| {
        document.extract_text(&[number])
    })
}

/// Extract every page with `extract`. A page whose text cannot be read fails
/// the whole load, so an index is never built from part of a book.
#[cfg(feature = "pdf")]
fn collect_pages<E, F>(
    path: &Path,
    numbers: impl IntoIterator<Item = u32>,
    mut extract: F,
) -> Result<Vec<Page>>
where
    E: std::fmt::Display,
    F: FnMut(u32) -> std::result::Result<String, E>,
{
    numbers
        .into_iter()
        .map(|number| {
            extract(number)
                .map(|text| Page { number, text })
                .map_err(|e| {
                    warn!(path = %path.display(), page = number, error = %e, "failed to extract page text");
                    loader_error(path, format!("page {number}: {e}"))
                })
        })
        .collect()
}

#[cfg(not(feature = "pdf"))]
async fn load_pdf_pages(path: &Path) -> Result<Vec<Page>> {
    Err(loader_error(path, "PDF support is not enabled (build with the `pdf` feature)"))
}
