//! docrag-extract
//!
//! Text extractors turning stored source documents into per-page text. See
//! `pdf` and `plain` for the format adapters and [`AutoExtractor`] for
//! extension-based dispatch.

use std::path::Path;

use docrag_core::error::{Error, Result};
use docrag_core::traits::TextExtractor;
use docrag_core::types::PageText;

pub mod pdf;
pub mod plain;

pub use pdf::PdfExtractor;
pub use plain::PlainTextExtractor;

/// Picks an extractor from the file extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoExtractor;

impl TextExtractor for AutoExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<PageText>> {
        let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("pdf") => PdfExtractor.extract(path),
            Some("txt" | "text" | "md") => PlainTextExtractor.extract(path),
            other => Err(Error::Extraction(format!(
                "unsupported file type {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }
}
