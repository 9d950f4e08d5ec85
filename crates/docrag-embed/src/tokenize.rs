use anyhow::{Result, anyhow};
use candle_core::{Device, Tensor};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

/// Load a tokenizer that pads to the longest sequence in a batch and truncates at `max_len`.
pub fn load_tokenizer(path: &std::path::Path, max_len: usize) -> Result<Tokenizer> {
    let mut tokenizer = Tokenizer::from_file(path)
        .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", path.display(), e))?;
    tokenizer.with_padding(Some(PaddingParams { strategy: PaddingStrategy::BatchLongest, ..Default::default() }));
    tokenizer
        .with_truncation(Some(TruncationParams { max_length: max_len, ..Default::default() }))
        .map_err(|e| anyhow!("Invalid truncation settings: {}", e))?;
    Ok(tokenizer)
}

/// Tokenize a batch into `(input_ids, attention_mask)`, both shaped `[B, T]`.
pub fn tokenize_batch(tokenizer: &Tokenizer, texts: &[String], device: &Device) -> Result<(Tensor, Tensor)> {
    let encodings = tokenizer
        .encode_batch(texts.to_vec(), true)
        .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let seq_len = encodings.first().map(|e| e.get_ids().len()).unwrap_or(0);
    let mut ids = Vec::with_capacity(texts.len() * seq_len);
    let mut mask = Vec::with_capacity(texts.len() * seq_len);
    for enc in &encodings {
        ids.extend_from_slice(enc.get_ids());
        mask.extend_from_slice(enc.get_attention_mask());
    }
    let input_ids = Tensor::from_vec(ids, (encodings.len(), seq_len), device)?;
    let attention_mask = Tensor::from_vec(mask, (encodings.len(), seq_len), device)?;
    Ok((input_ids, attention_mask))
}
