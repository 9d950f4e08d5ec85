use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use docrag_core::chunker::chunk_pages;
use docrag_core::config::Settings;
use docrag_core::traits::{Embedder, TextExtractor, TextGenerator};
use docrag_core::types::{Answer, DocId, IngestReport, RetrievalResult};
use docrag_core::{Error, Result};
use docrag_extract::AutoExtractor;
use docrag_vector::{IndexBuilder, IndexStore, Retriever};

use crate::generate::ChatCompletionsClient;
use crate::synth::AnswerSynthesizer;

/// Ingestion and question answering over per-document indexes.
///
/// The embedder and generator are created once and shared; every call is
/// synchronous and independent of the others.
pub struct DocQa {
    settings: Settings,
    store: IndexStore,
    extractor: Box<dyn TextExtractor>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn TextGenerator>,
}

impl DocQa {
    pub fn new(
        settings: Settings,
        extractor: Box<dyn TextExtractor>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self> {
        settings.validate()?;
        let store = IndexStore::open(settings.storage.index_root_path())?;
        Ok(Self { settings, store, extractor, embedder, generator })
    }

    /// Wire up the default adapters: extension-based extraction, the
    /// configured embedder and the chat-completions client.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let embedder = docrag_embed::get_default_embedder(&settings.embedding)?;
        let generator = Arc::new(ChatCompletionsClient::new(&settings.generation)?);
        Self::new(settings, Box::new(AutoExtractor), embedder, generator)
    }

    pub fn settings(&self) -> &Settings { &self.settings }

    pub fn store(&self) -> &IndexStore { &self.store }

    /// Extract, chunk, embed and persist a document under a fresh id.
    pub fn ingest(&self, path: &Path) -> Result<IngestReport> {
        let start = Instant::now();
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let pages = self.extractor.extract(path)?;
        let chunks = chunk_pages(&pages, &self.settings.chunking)?;
        if chunks.is_empty() {
            return Err(Error::EmptyDocument(source));
        }

        let doc_id = DocId::generate();
        IndexBuilder::new(self.embedder.as_ref()).build_and_save(&self.store, &doc_id, &chunks, Some(&source))?;
        tracing::info!(
            doc_id = %doc_id,
            source = %source,
            pages = pages.len(),
            chunks = chunks.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "ingested document"
        );
        Ok(IngestReport { doc_id, chunk_count: chunks.len(), pages: pages.len(), source })
    }

    pub fn retrieve(&self, doc_id: &DocId, question: &str, top_k: usize) -> Result<Vec<RetrievalResult>> {
        let stored = self.store.load(doc_id)?;
        Retriever::new(self.embedder.as_ref()).retrieve_stored(question, &stored, top_k)
    }

    pub fn answer(&self, doc_id: &DocId, question: &str) -> Result<Answer> {
        self.answer_with(doc_id, question, self.settings.retrieval.top_k)
    }

    pub fn answer_with(&self, doc_id: &DocId, question: &str, top_k: usize) -> Result<Answer> {
        let start = Instant::now();
        let sources = self.retrieve(doc_id, question, top_k)?;
        let answer = AnswerSynthesizer::new(self.generator.as_ref()).synthesize(question, &sources)?;
        tracing::info!(
            doc_id = %doc_id,
            top_k,
            sources = sources.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "answered question"
        );
        Ok(Answer { answer, sources })
    }
}
