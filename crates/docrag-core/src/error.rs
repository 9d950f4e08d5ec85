use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Index for document {doc_id} is corrupt: {reason}")]
    Corrupt { doc_id: String, reason: String },

    #[error("Index for document {doc_id} is unavailable: {source}")]
    Unavailable {
        doc_id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Generation service failed{}: {message}", status_suffix(*.status))]
    Upstream { status: Option<u16>, message: String },

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Document {0} contains no extractable text")]
    EmptyDocument(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn corrupt(doc_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Corrupt { doc_id: doc_id.into(), reason: reason.into() }
    }

    pub fn unavailable(doc_id: impl Into<String>, source: std::io::Error) -> Self {
        Self::Unavailable { doc_id: doc_id.into(), source }
    }

    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream { status, message: message.into() }
    }

    /// True when the caller asked for a document that was never (fully) ingested.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

fn status_suffix(status: Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;
