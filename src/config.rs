//! Environment-driven configuration for the resume agent.
//!
//! All knobs come from the process environment (optionally seeded from a
//! `.env` file by the caller via `dotenvy`); none of them are CLI flags.

use std::env;
use std::path::PathBuf;

use crate::types::RagError;

/// Default chat-completion model. Temperature is pinned to 0 for
/// deterministic-leaning answers.
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";
/// Default embedding model; must be compatible with the completion model's
/// provider.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
/// Vector width of [`DEFAULT_EMBEDDING_MODEL`].
pub const DEFAULT_EMBEDDING_DIMS: usize = 1536;

/// Runtime settings assembled once at process start.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Path to the source resume document (text or Markdown).
    pub document_path: PathBuf,
    /// Path of the persisted SQLite vector index.
    pub index_path: PathBuf,
    /// Source identifier stamped on every chunk and stored row.
    pub collection: String,
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Character overlap carried between adjacent chunks.
    pub chunk_overlap: usize,
    /// Number of nearest chunks returned per retrieval.
    pub top_k: usize,
    /// Destroy and rebuild the index regardless of the stored fingerprint.
    pub force_recreate: bool,
    /// Chat-completion model name.
    pub completion_model: String,
    /// Embedding model name.
    pub embedding_model: String,
    /// Embedding vector width; fixed per store.
    pub embedding_dims: usize,
    /// API key for the OpenAI-compatible endpoints.
    pub api_key: String,
    /// Base URL of the OpenAI-compatible API, without a trailing slash.
    pub api_base: String,
    /// Override for the persona system prompt; `None` uses the built-in one.
    pub system_prompt: Option<String>,
}

impl Settings {
    /// Reads settings from the environment.
    ///
    /// `OPENAI_API_KEY` is required; everything else has a default.
    pub fn from_env() -> Result<Self, RagError> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| RagError::Config("OPENAI_API_KEY is not set".to_string()))?;

        Ok(Self {
            document_path: env::var("RESUME_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("resume.md")),
            index_path: env::var("RESUME_INDEX_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("resume_index.sqlite")),
            collection: env::var("RESUME_COLLECTION").unwrap_or_else(|_| "resume".to_string()),
            chunk_size: parse_env("RESUME_CHUNK_SIZE", 800)?,
            chunk_overlap: parse_env("RESUME_CHUNK_OVERLAP", 50)?,
            top_k: parse_env("RESUME_TOP_K", 3)?,
            force_recreate: env_flag("RESUME_FORCE_RECREATE"),
            completion_model: env::var("RESUME_COMPLETION_MODEL")
                .unwrap_or_else(|_| DEFAULT_COMPLETION_MODEL.to_string()),
            embedding_model: env::var("RESUME_EMBEDDING_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dims: parse_env("RESUME_EMBEDDING_DIMS", DEFAULT_EMBEDDING_DIMS)?,
            api_key,
            api_base: env::var("OPENAI_BASE_URL")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            system_prompt: env::var("RESUME_SYSTEM_PROMPT").ok(),
        })
    }

    /// Path of the fingerprint sidecar written next to the index database.
    pub fn fingerprint_path(&self) -> PathBuf {
        let mut path = self.index_path.clone().into_os_string();
        path.push(".fingerprint");
        PathBuf::from(path)
    }
}

fn parse_env(key: &str, default: usize) -> Result<usize, RagError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<usize>()
            .map_err(|err| RagError::Config(format!("{key}={raw} is not a number: {err}"))),
        Err(_) => Ok(default),
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
