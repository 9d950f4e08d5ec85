use docrag_core::config::EmbeddingSettings;
use docrag_embed::get_default_embedder;

fn main() -> anyhow::Result<()> {
    let embedder = get_default_embedder(&EmbeddingSettings::default())?;
    let texts = vec!["hello world".to_string(), "rust embeddings".to_string()];
    let embs = embedder.embed_batch(&texts)?;
    println!("model={} B={} dim={}", embedder.model_id(), embs.len(), embedder.dim());
    Ok(())
}
