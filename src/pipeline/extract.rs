//! PDF text extraction: one chapter per non-empty source page.
//!
//! A thin wrapper over lopdf. Pages with no extractable text (scanned
//! images, decorative pages) are skipped, so chapter ids follow the source
//! page numbers and are not necessarily contiguous.
//!
//! lopdf parsing is synchronous and CPU-bound; callers on the async path
//! run this inside `spawn_blocking` (see [`crate::service`]).

use lopdf::Document;
use tracing::{debug, warn};

use crate::chapter::Chapter;
use crate::error::TranslateError;

/// Extract per-page chapters from raw PDF bytes.
///
/// Fails for unparseable or encrypted documents, and when no page yields
/// any text at all.
pub fn extract_chapters(bytes: &[u8]) -> Result<Vec<Chapter>, TranslateError> {
    let doc = Document::load_mem(bytes).map_err(|e| TranslateError::CorruptPdf {
        detail: e.to_string(),
    })?;

    if doc.is_encrypted() {
        return Err(TranslateError::EncryptedPdf);
    }

    let mut chapters = Vec::new();
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    for page_num in page_numbers {
        match doc.extract_text(&[page_num]) {
            Ok(text) if !text.trim().is_empty() => {
                chapters.push(Chapter::new(page_num, text.trim().to_string()));
            }
            Ok(_) => debug!(page = page_num, "page has no extractable text, skipping"),
            Err(e) => warn!(page = page_num, "text extraction failed: {e}"),
        }
    }

    if chapters.is_empty() {
        return Err(TranslateError::EmptyDocument);
    }

    debug!(chapters = chapters.len(), "extracted chapters from PDF");
    Ok(chapters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_a_corrupt_pdf() {
        let err = extract_chapters(b"not a pdf at all").unwrap_err();
        assert!(matches!(err, TranslateError::CorruptPdf { .. }));
    }

    #[test]
    fn empty_input_is_a_corrupt_pdf() {
        let err = extract_chapters(&[]).unwrap_err();
        assert!(matches!(err, TranslateError::CorruptPdf { .. }));
    }
}
