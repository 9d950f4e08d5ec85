//! Typed settings and the layered loader behind them.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`,
//! an optional explicit file and `APP_*` env vars.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_GENERATION_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub size: usize,
    pub overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self { size: 500, overlap: 100 }
    }
}

impl ChunkingSettings {
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(Error::ConfigInvalid("chunking.size must be positive".into()));
        }
        if self.overlap >= self.size {
            return Err(Error::ConfigInvalid(format!(
                "chunking.overlap ({}) must be smaller than chunking.size ({})",
                self.overlap, self.size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self { Self { top_k: 4 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub index_root: String,
}

impl Default for StorageSettings {
    fn default() -> Self { Self { index_root: "data/indexes".into() } }
}

impl StorageSettings {
    pub fn index_root_path(&self) -> PathBuf { expand_path(&self.index_root) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    Bert,
    Fake,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub backend: EmbeddingBackend,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_dir: Option<String>,
    pub max_len: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Bert,
            model: "sentence-transformers/all-MiniLM-L6-v2".into(),
            model_dir: None,
            max_len: 256,
            batch_size: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GENERATION_ENDPOINT.into(),
            model: "llama-3.1-8b-instant".into(),
            temperature: 0.0,
            max_tokens: 400,
            api_key: None,
            timeout_secs: 60,
        }
    }
}

/// Everything the pipeline can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub storage: StorageSettings,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.retrieval.top_k == 0 {
            return Err(Error::ConfigInvalid("retrieval.top_k must be at least 1".into()));
        }
        if self.embedding.model.trim().is_empty() {
            return Err(Error::ConfigInvalid("embedding.model must not be empty".into()));
        }
        if self.embedding.max_len == 0 || self.embedding.batch_size == 0 {
            return Err(Error::ConfigInvalid("embedding.max_len and embedding.batch_size must be positive".into()));
        }
        let generation = &self.generation;
        if generation.endpoint.trim().is_empty() || generation.model.trim().is_empty() {
            return Err(Error::ConfigInvalid("generation.endpoint and generation.model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&generation.temperature) {
            return Err(Error::ConfigInvalid(format!("generation.temperature {} is outside [0, 2]", generation.temperature)));
        }
        if generation.max_tokens == 0 {
            return Err(Error::ConfigInvalid("generation.max_tokens must be positive".into()));
        }
        Ok(())
    }
}

/// Layered configuration: defaults < `config.toml` < `config.<env>.toml` <
/// explicit file < `APP_*` environment variables (`__` separates sections).
pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_with(None)
    }

    pub fn load_with(extra_file: Option<&Path>) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        if let Some(path) = extra_file {
            if !path.exists() {
                return Err(Error::ConfigInvalid(format!("config file {} does not exist", path.display())));
            }
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        tracing::debug!(env = %env_name, "configuration sources merged");
        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::ConfigInvalid(format!("Failed to get '{}': {}", key, e)))
    }

    /// Extract and validate the typed settings. The generation credential
    /// falls back to `GROQ_API_KEY`.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::ConfigInvalid(e.to_string()))?;
        if settings.generation.api_key.is_none() {
            settings.generation.api_key = env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty());
        }
        settings.validate()?;
        Ok(settings)
    }
}

/// Load variables from a `.env` file in the working directory (or a parent)
/// into the process environment. Variables already set are left alone, so
/// the real environment wins. A missing file is not an error.
pub fn load_dotenv() -> std::result::Result<Option<PathBuf>, dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

