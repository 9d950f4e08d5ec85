use docrag_core::config::{EmbeddingBackend, EmbeddingSettings};
use docrag_embed::{get_default_embedder, FAKE_EMBEDDING_DIM};

fn fake_settings() -> EmbeddingSettings {
    EmbeddingSettings { backend: EmbeddingBackend::Fake, ..EmbeddingSettings::default() }
}

#[test]
fn fake_embedder_shapes_and_determinism() {
    let embedder = get_default_embedder(&fake_settings()).expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string(), "something else".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    assert_eq!(embs.len(), 3);
    assert_eq!(embedder.dim(), FAKE_EMBEDDING_DIM);
    assert!(embs.iter().all(|v| v.len() == FAKE_EMBEDDING_DIM));

    // Deterministic for same input
    for (a, b) in embs[0].iter().zip(embs[1].iter()) { assert!((a - b).abs() <= 1e-6); }
    assert_ne!(embs[0], embs[2]);

    // Same text embedded in separate calls, normalized, has self-similarity 1
    let again = embedder.embed("hello world").expect("embed");
    let norm = |v: &[f32]| v.iter().map(|x| x * x).sum::<f32>().sqrt();
    let dot: f32 = embs[0].iter().zip(&again).map(|(a, b)| a * b).sum::<f32>() / (norm(&embs[0]) * norm(&again));
    assert!((dot - 1.0).abs() <= 1e-5, "dot={dot}");
}

#[test]
fn fake_embedder_handles_empty_batch() {
    let embedder = get_default_embedder(&fake_settings()).expect("embedder");
    assert!(embedder.embed_batch(&[]).expect("embed_batch").is_empty());
    assert!(embedder.model_id().starts_with("fake:"));
}
