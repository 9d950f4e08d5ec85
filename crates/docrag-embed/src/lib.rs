//! Sentence embedders for docrag.
//!
//! [`BertEmbedder`] runs a local BERT-family sentence-transformer with candle.
//! [`FakeEmbedder`] is a deterministic token-hashing stand-in for tests and
//! development, selected with `embedding.backend = "fake"` or
//! `APP_USE_FAKE_EMBEDDINGS=1`.

use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::Tokenizer;

use docrag_core::config::{expand_path, EmbeddingBackend, EmbeddingSettings};
use docrag_core::error::Error;
use docrag_core::traits::Embedder;

pub mod device;
pub mod pool;
pub mod tokenize;

pub use pool::masked_mean;

pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    model_id: String,
    dim: usize,
    batch_size: usize,
}

impl BertEmbedder {
    pub fn load(settings: &EmbeddingSettings) -> Result<Self> {
        let device = device::select_device();
        let model_dir = resolve_model_dir(settings)?;
        tracing::info!(model = %settings.model, dir = %model_dir.display(), "loading embedding model");

        let tokenizer = tokenize::load_tokenizer(&model_dir.join("tokenizer.json"), settings.max_len)?;
        let config_path = model_dir.join("config.json");
        let config: BertConfig = serde_json::from_str(
            &std::fs::read_to_string(&config_path).with_context(|| format!("reading {}", config_path.display()))?,
        )
        .with_context(|| format!("parsing {}", config_path.display()))?;
        let vb = load_weights(&model_dir, &device)?;
        let model = BertModel::load(vb, &config)?;

        tracing::info!(dim = config.hidden_size, "embedding model loaded");
        Ok(Self {
            model,
            tokenizer,
            device,
            model_id: settings.model.clone(),
            dim: config.hidden_size,
            batch_size: settings.batch_size.max(1),
        })
    }

    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let (input_ids, attention_mask) = tokenize::tokenize_batch(&self.tokenizer, texts, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean(&hidden, &attention_mask)?;
        Ok(pooled.to_device(&Device::Cpu)?.to_vec2::<f32>()?)
    }
}

impl Embedder for BertEmbedder {
    fn model_id(&self) -> &str { &self.model_id }
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> docrag_core::Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let vectors = self.embed_chunk(batch).map_err(|e| Error::Embedding(format!("{e:#}")))?;
            out.extend(vectors);
        }
        tracing::debug!(texts = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(out)
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        // SAFETY: the weights file is memory-mapped read-only and not modified while the model lives.
        return Ok(unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DTYPE, device)? });
    }
    let pth = model_dir.join("pytorch_model.bin");
    if pth.exists() {
        let weights = candle_core::pickle::read_all(&pth)?;
        let weights_map: std::collections::HashMap<String, Tensor> = weights.into_iter().collect();
        return Ok(VarBuilder::from_tensors(weights_map, DType::F32, device));
    }
    Err(anyhow!("No model.safetensors or pytorch_model.bin in {}", model_dir.display()))
}

fn resolve_model_dir(settings: &EmbeddingSettings) -> Result<PathBuf> {
    if let Some(dir) = &settings.model_dir {
        let p = expand_path(dir);
        if p.exists() { return Ok(p); }
        return Err(anyhow!("embedding.model_dir {} does not exist", p.display()));
    }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) { let p = PathBuf::from(&dir); if p.exists() { tracing::debug!(var, dir = %p.display(), "model dir from env"); return Ok(p); } }
    }
    let name = settings.model.rsplit('/').next().unwrap_or(&settings.model);
    for root in ["models", "../models"] {
        let p = Path::new(root).join(name);
        if p.exists() { return Ok(p); }
    }
    Err(anyhow!("Could not locate model directory for {}", settings.model))
}

/// Deterministic embedder hashing lowercase alphanumeric tokens into buckets.
/// Texts sharing words get similar vectors, which is enough for tests.
pub struct FakeEmbedder { dim: usize, model_id: String }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim, model_id: format!("fake:xxhash64:d{dim}") }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        let tokens = text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty());
        for token in tokens {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            v[idx] += 0.5 + ((h >> 32) as u32) as f32 / u32::MAX as f32;
        }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn model_id(&self) -> &str { &self.model_id }
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> docrag_core::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

pub const FAKE_EMBEDDING_DIM: usize = 384;

fn fake_requested() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// Build the process-wide embedder once at startup; it is shared read-only afterwards.
pub fn get_default_embedder(settings: &EmbeddingSettings) -> docrag_core::Result<Arc<dyn Embedder>> {
    if settings.backend == EmbeddingBackend::Fake || fake_requested() {
        tracing::warn!("using FakeEmbedder; retrieval quality is not meaningful");
        return Ok(Arc::new(FakeEmbedder::new(FAKE_EMBEDDING_DIM)));
    }
    let model = BertEmbedder::load(settings).map_err(|e| Error::Embedding(format!("{e:#}")))?;
    Ok(Arc::new(model))
}
