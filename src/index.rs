//! Vector index lifecycle: build, reuse, and query.
//!
//! The index owns the rebuild policy. Rather than recreating the store on
//! every start, a fingerprint of the chunked source text is persisted beside
//! the database; the store is rebuilt only when the fingerprint mismatches,
//! the store is missing or unreadable, or a force flag is set. This is a
//! cache-invalidation policy with a single logical owner, not a
//! concurrency-safe one.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::{info, warn};

use crate::embeddings::EmbeddingProvider;
use crate::ingestion::Chunk;
use crate::stores::{Backend, ChunkRecord, SqliteChunkStore};
use crate::types::RagError;

/// Largest number of texts sent to the embedding service per request.
const EMBED_BATCH_SIZE: usize = 64;

/// Options controlling where the index lives and when it is rebuilt.
#[derive(Clone, Debug)]
pub struct IndexOptions {
    pub index_path: PathBuf,
    pub fingerprint_path: PathBuf,
    pub force_recreate: bool,
}

/// A queryable nearest-neighbor index over chunk embeddings.
pub struct VectorIndex<B: Backend> {
    store: B,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl<B: Backend> VectorIndex<B> {
    /// Wraps an already-populated store. Primary constructor for tests and
    /// alternative backends.
    pub fn from_parts(store: B, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    /// Returns the `k` nearest chunks to `text`, most relevant first.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<(ChunkRecord, f32)>, RagError> {
        let query_embedding = self.embedder.embed(text).await?;
        self.store.search_similar(&query_embedding, k).await
    }

    /// Number of chunks behind the index.
    pub async fn chunk_count(&self) -> Result<usize, RagError> {
        self.store.count().await
    }
}

impl VectorIndex<SqliteChunkStore> {
    /// Opens the persisted index when it matches `chunks`, rebuilding it
    /// otherwise.
    ///
    /// Rebuild triggers: the force flag, a missing store, a fingerprint
    /// mismatch (source document changed), or an unreadable existing store.
    pub async fn open_or_build(
        options: &IndexOptions,
        chunks: &[Chunk],
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, RagError> {
        let fingerprint = fingerprint_chunks(chunks, embedder.model_id(), embedder.dims());
        let stored = read_fingerprint(&options.fingerprint_path).await;

        let reuse = !options.force_recreate
            && options.index_path.exists()
            && stored.as_deref() == Some(fingerprint.as_str());

        if reuse {
            match SqliteChunkStore::open(&options.index_path, embedder.dims()).await {
                Ok(store) => {
                    info!(path = %options.index_path.display(), "reusing persisted vector index");
                    return Ok(Self::from_parts(store, embedder));
                }
                Err(err) => {
                    warn!(error = %err, "persisted index unreadable, rebuilding");
                }
            }
        }

        Self::rebuild(options, chunks, &fingerprint, embedder).await
    }

    async fn rebuild(
        options: &IndexOptions,
        chunks: &[Chunk],
        fingerprint: &str,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, RagError> {
        remove_if_present(&options.index_path).await?;
        remove_if_present(&options.fingerprint_path).await?;

        let store = SqliteChunkStore::open(&options.index_path, embedder.dims()).await?;

        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
            let embeddings = embedder.embed_batch(&texts).await?;
            if embeddings.len() != batch.len() {
                return Err(RagError::Embedding(format!(
                    "expected {} vectors, got {}",
                    batch.len(),
                    embeddings.len()
                )));
            }
            let records: Vec<ChunkRecord> = batch
                .iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| ChunkRecord::from_chunk(chunk, embedding))
                .collect();
            store.insert_chunks(records).await?;
        }

        write_fingerprint(&options.fingerprint_path, fingerprint).await?;
        info!(
            path = %options.index_path.display(),
            chunks = chunks.len(),
            "vector index rebuilt"
        );
        Ok(Self::from_parts(store, embedder))
    }
}

/// Stable fingerprint of the indexed content: chunk order, page placement,
/// text, and the embedding configuration all participate. Editing the source
/// document or switching the embedding model or width invalidates the
/// persisted index; stored vectors are only reusable under the exact
/// configuration that produced them.
pub fn fingerprint_chunks(chunks: &[Chunk], embedding_model: &str, dims: usize) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    embedding_model.hash(&mut hasher);
    dims.hash(&mut hasher);
    chunks.len().hash(&mut hasher);
    for chunk in chunks {
        chunk.chunk_index.hash(&mut hasher);
        chunk.page.hash(&mut hasher);
        chunk.text.hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}

async fn read_fingerprint(path: &Path) -> Option<String> {
    match fs::read_to_string(path).await {
        Ok(raw) => Some(raw.trim().to_string()),
        Err(_) => None,
    }
}

async fn write_fingerprint(path: &Path, fingerprint: &str) -> Result<(), RagError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, fingerprint).await?;
    Ok(())
}

async fn remove_if_present(path: &Path) -> Result<(), RagError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
