//! Fixed-size, overlapping character windows over page text.
//!
//! Sizes are counted in Unicode scalar values, not tokens, so windows may cut
//! through words.

use std::ops::Range;

use crate::config::ChunkingSettings;
use crate::error::Result;
use crate::types::{Chunk, PageText};

/// Window boundaries over the trimmed `text`, as character offsets.
///
/// Consecutive windows share `overlap` characters; the last window always ends
/// at the end of the text.
pub fn chunk_spans(text: &str, settings: &ChunkingSettings) -> Result<Vec<Range<usize>>> {
    settings.validate()?;
    let len = text.trim().chars().count();
    let mut spans = Vec::new();
    let mut start = 0;
    while start < len {
        let end = (start + settings.size).min(len);
        spans.push(start..end);
        if end == len { break; }
        start = end - settings.overlap;
    }
    Ok(spans)
}

pub fn chunk_text(text: &str, settings: &ChunkingSettings) -> Result<Vec<String>> {
    let trimmed = text.trim();
    let spans = chunk_spans(trimmed, settings)?;
    if spans.is_empty() { return Ok(Vec::new()); }
    // char offset -> byte offset, with a trailing entry for the end of text
    let bounds: Vec<usize> = trimmed.char_indices().map(|(b, _)| b).chain(std::iter::once(trimmed.len())).collect();
    Ok(spans
        .into_iter()
        .map(|span| trimmed[bounds[span.start]..bounds[span.end]].trim())
        .filter(|window| !window.is_empty())
        .map(str::to_string)
        .collect())
}

/// Chunk every page, keeping page numbers and extraction order.
pub fn chunk_pages(pages: &[PageText], settings: &ChunkingSettings) -> Result<Vec<Chunk>> {
    settings.validate()?;
    let mut chunks = Vec::new();
    for page in pages {
        for text in chunk_text(&page.text, settings)? {
            chunks.push(Chunk { page: page.page, text });
        }
    }
    tracing::debug!(pages = pages.len(), chunks = chunks.len(), "chunked document");
    Ok(chunks)
}
