//! Domain types shared by the ingestion and query paths.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Identifier of an ingested document.
///
/// Freshly generated ids are random UUIDs. Ids coming from callers are only
/// accepted when they are plain path-safe tokens, so a `DocId` can always be
/// used as a directory name under the index root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocId(String);

impl DocId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Validate a caller-supplied id. An id that cannot name a stored
    /// document is reported as `NotFound`.
    pub fn parse(raw: &str) -> Result<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= 128
            && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid { Ok(Self(raw.to_string())) } else { Err(Error::NotFound(raw.to_string())) }
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for DocId {
    type Error = Error;
    fn try_from(value: String) -> Result<Self> { Self::parse(&value) }
}

impl From<DocId> for String {
    fn from(id: DocId) -> Self { id.0 }
}

/// Raw text of one page as produced by a text extractor. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page: u32,
    pub text: String,
}

/// A window of page text; the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub page: u32,
    pub text: String,
}

/// A chunk scored against a query. `score` is the inner product of the
/// normalized query and chunk vectors; higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub page: u32,
    pub text: String,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<RetrievalResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub doc_id: DocId,
    pub chunk_count: usize,
    pub pages: usize,
    pub source: String,
}
