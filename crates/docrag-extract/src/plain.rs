use std::fs;
use std::path::Path;

use docrag_core::error::{Error, Result};
use docrag_core::traits::TextExtractor;
use docrag_core::types::PageText;

/// Plain text files; form feeds (`\x0c`) separate pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    fn read_file_content(path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| Error::Extraction(format!("{}: {}", path.display(), e)))?;
        Ok(match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<PageText>> {
        let content = Self::read_file_content(path)?;
        Ok(content
            .split('\x0c')
            .zip(1u32..)
            .map(|(text, page)| PageText { page, text: text.to_string() })
            .collect())
    }
}
