//! PDF page counting and text-layer extraction.

use lopdf::Document;
use tracing::debug;

use super::error::ExtractError;

/// Number of pages in a PDF.
///
/// # Errors
///
/// Returns `ExtractError::Parse` if the bytes are not a readable PDF.
pub fn page_count(bytes: &[u8]) -> Result<u32, ExtractError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractError::Parse(e.to_string()))?;
    Ok(u32::try_from(doc.get_pages().len()).unwrap_or(u32::MAX))
}

/// Text layer of a PDF, page by page.
///
/// Pages that fail to decode are skipped. Non-empty pages are joined
/// with a blank line; a PDF with no extractable text yields an empty
/// string.
///
/// # Errors
///
/// Returns `ExtractError::Parse` if the document itself cannot be read.
pub fn text(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractError::Parse(e.to_string()))?;

    let mut pages = Vec::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(content) => {
                let content = content.trim();
                if !content.is_empty() {
                    pages.push(content.to_string());
                }
            }
            Err(e) => {
                debug!(page = page_number, error = %e, "skipping undecodable PDF page");
            }
        }
    }

    Ok(pages.join("\n\n"))
}
