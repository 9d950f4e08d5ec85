//! Embed chunks, normalize, and assemble the flat index for one document.

use std::time::Instant;

use docrag_core::traits::Embedder;
use docrag_core::types::{Chunk, DocId};
use docrag_core::{Error, Result};

use crate::flat::{normalize_l2, FlatIpIndex};
use crate::manifest::Manifest;
use crate::store::IndexStore;

pub struct IndexBuilder<'a> {
    embedder: &'a dyn Embedder,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(embedder: &'a dyn Embedder) -> Self {
        Self { embedder }
    }

    /// One vector per chunk, in chunk order. Any embedding failure aborts the
    /// whole build.
    pub fn build(&self, chunks: &[Chunk]) -> Result<FlatIpIndex> {
        let dim = self.embedder.dim();
        let mut index = FlatIpIndex::new(dim);
        if chunks.is_empty() {
            return Ok(index);
        }
        let start = Instant::now();
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts)?;
        if vectors.len() != chunks.len() {
            return Err(Error::Embedding(format!(
                "embedder returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }
        for mut vector in vectors {
            if vector.len() != dim {
                return Err(Error::Embedding(format!("embedder returned dimension {}, expected {dim}", vector.len())));
            }
            normalize_l2(&mut vector);
            index.add(&vector)?;
        }
        tracing::info!(
            chunks = chunks.len(),
            dim,
            model = self.embedder.model_id(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built index"
        );
        Ok(index)
    }

    pub fn build_and_save(
        &self,
        store: &IndexStore,
        doc_id: &DocId,
        chunks: &[Chunk],
        source: Option<&str>,
    ) -> Result<Manifest> {
        if chunks.is_empty() {
            return Err(Error::EmptyDocument(source.unwrap_or(doc_id.as_str()).to_string()));
        }
        let index = self.build(chunks)?;
        store.save(doc_id, &index, chunks, self.embedder.model_id(), source)
    }
}
