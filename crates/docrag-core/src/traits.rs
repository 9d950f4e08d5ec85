use std::path::Path;

use crate::error::{Error, Result};
use crate::types::PageText;

/// Maps text to fixed-dimension vectors. Implementations are created once and
/// shared read-only across requests.
pub trait Embedder: Send + Sync {
    /// Stable identifier of the model/version; recorded with every index.
    fn model_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| Error::Embedding("embedder returned no vector".into()))
    }
}

/// Synchronous text completion backed by an external generative service.
pub trait TextGenerator: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Turns a stored source document into per-page raw text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<Vec<PageText>>;
}
