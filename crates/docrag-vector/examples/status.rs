use docrag_core::config::Config;
use docrag_vector::IndexStore;

fn main() -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let root = settings.storage.index_root_path();
    let store = IndexStore::open(&root)?;
    let manifests = store.list()?;
    println!("index root {}: {} documents", root.display(), manifests.len());
    for m in manifests {
        println!(
            "{}  chunks={} dim={} model={} source={} created={}",
            m.doc_id,
            m.count,
            m.dim,
            m.model_id,
            m.source.as_deref().unwrap_or("-"),
            m.created_at.to_rfc3339()
        );
    }
    Ok(())
}
