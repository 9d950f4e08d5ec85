use std::path::Path;

use lopdf::Document;

use docrag_core::error::{Error, Result};
use docrag_core::traits::TextExtractor;
use docrag_core::types::PageText;

/// PDF text extraction with `lopdf`, one entry per page in page order.
///
/// A page whose text cannot be decoded comes back empty rather than failing
/// the whole document; it just contributes no chunks.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<PageText>> {
        let doc = Document::load(path).map_err(|e| Error::Extraction(format!("{}: {}", path.display(), e)))?;
        let pages = doc.get_pages();
        let mut out = Vec::with_capacity(pages.len());
        for page_no in pages.keys() {
            let text = match doc.extract_text(&[*page_no]) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(page = page_no, error = %e, file = %path.display(), "page text not extractable");
                    String::new()
                }
            };
            out.push(PageText { page: *page_no, text });
        }
        tracing::debug!(file = %path.display(), pages = out.len(), "extracted pdf");
        Ok(out)
    }
}
