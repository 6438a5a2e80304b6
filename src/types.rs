//! Shared error taxonomy for the resume agent.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by ingestion, indexing, retrieval, and the agent loop.
///
/// Variants map to the failure taxonomy of the system:
/// - [`RagError::NotFound`] and [`RagError::Load`] are fatal at startup.
/// - [`RagError::Storage`] during index open is recovered locally by a full
///   rebuild; everywhere else it propagates.
/// - Unknown tool names and empty retrievals are *not* errors: both are fed
///   back to the model as tool-output text (see `tools` and `agent`).
#[derive(Debug, Error)]
pub enum RagError {
    /// The configured source document does not exist.
    #[error("document not found: {0}")]
    NotFound(PathBuf),

    /// The source document exists but could not be parsed into text.
    #[error("failed to load document: {0}")]
    Load(String),

    /// SQLite / vector-store failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Embedding service failure.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Chat-completion service failure.
    #[error("completion error: {0}")]
    Completion(String),

    /// Missing or malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem failure outside of document loading.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RagError {
    fn from(err: std::io::Error) -> Self {
        RagError::Io(err.to_string())
    }
}
