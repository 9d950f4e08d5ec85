//! On-disk index store: one write-once directory per document.
//!
//! ```text
//! <root>/<doc_id>/meta.json      chunk (page, text) pairs, JSON
//! <root>/<doc_id>/index.bin      FlatIpIndex binary
//! <root>/<doc_id>/manifest.json  written last
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use docrag_core::types::{Chunk, DocId};
use docrag_core::{Error, Result};

use crate::flat::FlatIpIndex;
use crate::manifest::{digest, Manifest, MANIFEST_FORMAT_VERSION};

pub const INDEX_FILE: &str = "index.bin";
pub const META_FILE: &str = "meta.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// A fully loaded and verified document index.
#[derive(Debug, Clone)]
pub struct StoredIndex {
    pub manifest: Manifest,
    pub index: FlatIpIndex,
    pub chunks: Vec<Chunk>,
}

#[derive(Debug, Clone)]
pub struct IndexStore {
    root: PathBuf,
}

impl IndexStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path { &self.root }

    pub fn doc_dir(&self, doc_id: &DocId) -> PathBuf {
        self.root.join(doc_id.as_str())
    }

    pub fn exists(&self, doc_id: &DocId) -> bool {
        self.doc_dir(doc_id).join(MANIFEST_FILE).is_file()
    }

    /// Persist a document's index and metadata. The directory must not exist
    /// yet; on failure it is removed again so no partial document is left.
    pub fn save(
        &self,
        doc_id: &DocId,
        index: &FlatIpIndex,
        chunks: &[Chunk],
        model_id: &str,
        source: Option<&str>,
    ) -> Result<Manifest> {
        if index.len() != chunks.len() {
            return Err(Error::corrupt(
                doc_id.as_str(),
                format!("refusing to write {} vectors for {} chunks", index.len(), chunks.len()),
            ));
        }
        let dir = self.doc_dir(doc_id);
        fs::create_dir(&dir).map_err(|e| Error::unavailable(doc_id.as_str(), e))?;

        match self.write_artifacts(&dir, doc_id, index, chunks, model_id, source) {
            Ok(manifest) => {
                tracing::info!(doc_id = %doc_id, count = manifest.count, dim = manifest.dim, "index persisted");
                Ok(manifest)
            }
            Err(err) => {
                if let Err(cleanup) = fs::remove_dir_all(&dir) {
                    tracing::warn!(doc_id = %doc_id, error = %cleanup, "could not remove partial index directory");
                }
                Err(err)
            }
        }
    }

    fn write_artifacts(
        &self,
        dir: &Path,
        doc_id: &DocId,
        index: &FlatIpIndex,
        chunks: &[Chunk],
        model_id: &str,
        source: Option<&str>,
    ) -> Result<Manifest> {
        let meta_bytes = serde_json::to_vec(chunks)
            .map_err(|e| Error::corrupt(doc_id.as_str(), format!("encoding metadata: {e}")))?;
        let index_bytes = index.to_bytes();

        write_atomic(dir, META_FILE, &meta_bytes).map_err(|e| Error::unavailable(doc_id.as_str(), e))?;
        write_atomic(dir, INDEX_FILE, &index_bytes).map_err(|e| Error::unavailable(doc_id.as_str(), e))?;

        let manifest = Manifest {
            format_version: MANIFEST_FORMAT_VERSION,
            doc_id: doc_id.clone(),
            model_id: model_id.to_string(),
            dim: index.dim(),
            count: index.len(),
            index_digest: digest(&index_bytes),
            meta_digest: digest(&meta_bytes),
            source: source.map(str::to_string),
            created_at: Utc::now(),
        };
        let manifest_bytes = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| Error::corrupt(doc_id.as_str(), format!("encoding manifest: {e}")))?;
        write_atomic(dir, MANIFEST_FILE, &manifest_bytes).map_err(|e| Error::unavailable(doc_id.as_str(), e))?;
        Ok(manifest)
    }

    /// Load and verify a document. No manifest means the document was never
    /// (completely) ingested.
    pub fn load(&self, doc_id: &DocId) -> Result<StoredIndex> {
        let dir = self.doc_dir(doc_id);
        let manifest_bytes = match fs::read(dir.join(MANIFEST_FILE)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Error::NotFound(doc_id.to_string())),
            Err(e) => return Err(Error::unavailable(doc_id.as_str(), e)),
        };
        let manifest: Manifest = serde_json::from_slice(&manifest_bytes)
            .map_err(|e| Error::corrupt(doc_id.as_str(), format!("manifest: {e}")))?;
        if manifest.format_version != MANIFEST_FORMAT_VERSION {
            return Err(Error::corrupt(doc_id.as_str(), format!("unsupported manifest version {}", manifest.format_version)));
        }
        if manifest.doc_id != *doc_id {
            return Err(Error::corrupt(doc_id.as_str(), format!("manifest names document {}", manifest.doc_id)));
        }

        let meta_bytes = read_artifact(&dir, META_FILE, doc_id)?;
        let index_bytes = read_artifact(&dir, INDEX_FILE, doc_id)?;
        if digest(&meta_bytes) != manifest.meta_digest {
            return Err(Error::corrupt(doc_id.as_str(), "meta.json digest mismatch"));
        }
        if digest(&index_bytes) != manifest.index_digest {
            return Err(Error::corrupt(doc_id.as_str(), "index.bin digest mismatch"));
        }

        let chunks: Vec<Chunk> = serde_json::from_slice(&meta_bytes)
            .map_err(|e| Error::corrupt(doc_id.as_str(), format!("meta.json: {e}")))?;
        let index = FlatIpIndex::from_bytes(&index_bytes).map_err(|reason| Error::corrupt(doc_id.as_str(), reason))?;

        if index.len() != chunks.len() || index.len() != manifest.count {
            return Err(Error::corrupt(
                doc_id.as_str(),
                format!("{} vectors, {} chunks, manifest count {}", index.len(), chunks.len(), manifest.count),
            ));
        }
        if index.dim() != manifest.dim {
            return Err(Error::corrupt(
                doc_id.as_str(),
                format!("index dimension {} differs from manifest dimension {}", index.dim(), manifest.dim),
            ));
        }
        tracing::debug!(doc_id = %doc_id, count = index.len(), "index loaded");
        Ok(StoredIndex { manifest, index, chunks })
    }

    /// Manifests of every fully written document, oldest first. Directories
    /// without a readable manifest are skipped.
    pub fn list(&self) -> Result<Vec<Manifest>> {
        let mut manifests = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| Error::Io(io::Error::other(e)))?;
            if !entry.file_type().is_dir() { continue; }
            let path = entry.path().join(MANIFEST_FILE);
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "unreadable manifest");
                    continue;
                }
            };
            match serde_json::from_slice::<Manifest>(&bytes) {
                Ok(manifest) => manifests.push(manifest),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "invalid manifest"),
            }
        }
        manifests.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.doc_id.as_str().cmp(b.doc_id.as_str())));
        Ok(manifests)
    }
}

fn read_artifact(dir: &Path, name: &str, doc_id: &DocId) -> Result<Vec<u8>> {
    match fs::read(dir.join(name)) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::corrupt(doc_id.as_str(), format!("{name} is missing"))),
        Err(e) => Err(Error::unavailable(doc_id.as_str(), e)),
    }
}

fn write_atomic(dir: &Path, name: &str, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dir.join(name)).map_err(|e| e.error)?;
    Ok(())
}
