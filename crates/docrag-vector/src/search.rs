use docrag_core::traits::Embedder;
use docrag_core::types::{Chunk, RetrievalResult};
use docrag_core::{Error, Result};

use crate::flat::{normalize_l2, FlatIpIndex};
use crate::store::StoredIndex;

/// Semantic top-k over a single document's index.
pub struct Retriever<'a> {
    embedder: &'a dyn Embedder,
}

impl<'a> Retriever<'a> {
    pub fn new(embedder: &'a dyn Embedder) -> Self {
        Self { embedder }
    }

    pub fn retrieve(
        &self,
        query: &str,
        index: &FlatIpIndex,
        chunks: &[Chunk],
        top_k: usize,
    ) -> Result<Vec<RetrievalResult>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let mut q = self.embedder.embed(query)?;
        normalize_l2(&mut q);
        let hits = index.search(&q, top_k)?;
        // positions past the end of `chunks` are dropped
        let results: Vec<RetrievalResult> = hits
            .into_iter()
            .filter_map(|hit| {
                chunks.get(hit.position).map(|chunk| RetrievalResult {
                    page: chunk.page,
                    text: chunk.text.clone(),
                    score: hit.score,
                })
            })
            .collect();
        tracing::debug!(top_k, returned = results.len(), "retrieved");
        Ok(results)
    }

    /// Like [`Retriever::retrieve`], but refuses to query an index built by a
    /// different embedding model than the one this retriever uses.
    pub fn retrieve_stored(&self, query: &str, stored: &StoredIndex, top_k: usize) -> Result<Vec<RetrievalResult>> {
        let manifest = &stored.manifest;
        if manifest.model_id != self.embedder.model_id() || manifest.dim != self.embedder.dim() {
            return Err(Error::Embedding(format!(
                "document {} was indexed with {} (dim {}), queries use {} (dim {})",
                manifest.doc_id,
                manifest.model_id,
                manifest.dim,
                self.embedder.model_id(),
                self.embedder.dim()
            )));
        }
        self.retrieve(query, &stored.index, &stored.chunks, top_k)
    }
}
