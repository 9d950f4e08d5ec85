use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docrag_core::types::DocId;

pub const MANIFEST_FORMAT_VERSION: u32 = 1;

/// Written after both artifacts of a document; its presence is what makes the
/// document visible to readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    pub doc_id: DocId,
    pub model_id: String,
    pub dim: usize,
    pub count: usize,
    pub index_digest: String,
    pub meta_digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub fn digest(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}
