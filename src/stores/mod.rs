//! Storage backends for chunk documents and their embeddings.
//!
//! The [`Backend`] trait abstracts the persistence layer so the index and
//! the retrieval tool are not tied to one database. The shipped
//! implementation is [`sqlite::SqliteChunkStore`] (SQLite with vector search
//! via `sqlite-vec`); the trait is the seam for future stores.

pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ingestion::Chunk;
use crate::types::RagError;

pub use sqlite::SqliteChunkStore;

/// A chunk paired with its embedding, as persisted and as returned by
/// similarity search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: String,
    /// Source identifier the chunk was ingested under.
    pub source: String,
    /// Zero-based position within the source document.
    pub chunk_index: usize,
    /// 1-based page the chunk originated from.
    pub page: usize,
    pub content: String,
    /// Embedding vector; present when headed for insertion, absent on rows
    /// read back without their vectors.
    pub embedding: Option<Vec<f32>>,
}

impl ChunkRecord {
    /// Pairs an ingestion chunk with its embedding, ready for insertion.
    pub fn from_chunk(chunk: &Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: chunk.id.clone(),
            source: chunk.source.clone(),
            chunk_index: chunk.chunk_index,
            page: chunk.page,
            content: chunk.text.clone(),
            embedding: Some(embedding),
        }
    }
}

/// Unified interface for chunk storage backends.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Inserts chunk records with their embeddings. Records lacking an
    /// embedding are rejected with [`RagError::Storage`].
    async fn insert_chunks(&self, chunks: Vec<ChunkRecord>) -> Result<(), RagError>;

    /// K-nearest search by cosine similarity, most similar first.
    async fn search_similar(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<(ChunkRecord, f32)>, RagError>;

    /// Total number of stored chunks.
    async fn count(&self) -> Result<usize, RagError>;
}
