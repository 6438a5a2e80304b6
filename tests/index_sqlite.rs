//! Integration tests for the SQLite-backed vector index: build, reuse,
//! rebuild policy, and retrieval behavior. All offline via mock embeddings.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::tempdir;

use resume_agent::embeddings::{EmbeddingProvider, MockEmbeddingProvider};
use resume_agent::index::{IndexOptions, VectorIndex};
use resume_agent::ingestion::Chunk;
use resume_agent::stores::{Backend, SqliteChunkStore};
use resume_agent::tools::retriever::{NO_RESULTS_MESSAGE, RetrieverTool};
use resume_agent::tools::Tool;
use resume_agent::types::RagError;

/// Counts embedding batches so tests can tell a rebuild from a reuse.
struct CountingProvider {
    inner: MockEmbeddingProvider,
    model: String,
    batches: AtomicUsize,
}

impl CountingProvider {
    fn new() -> Arc<Self> {
        Self::labeled("mock-hash")
    }

    /// Same vectors, different reported model identity.
    fn labeled(model: &str) -> Arc<Self> {
        Arc::new(Self {
            inner: MockEmbeddingProvider::new(),
            model: model.to_string(),
            batches: AtomicUsize::new(0),
        })
    }

    fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for CountingProvider {
    fn dims(&self) -> usize {
        self.inner.dims()
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts).await
    }
}

fn chunk(index: usize, text: &str) -> Chunk {
    Chunk {
        id: format!("chunk-{index}"),
        text: text.to_string(),
        chunk_index: index,
        source: "resume".to_string(),
        page: index + 1,
    }
}

fn sample_chunks() -> Vec<Chunk> {
    vec![
        chunk(0, "Education: Penn State University, Computer Science."),
        chunk(1, "Projects: built a storage engine and a network service."),
        chunk(2, "Skills: Rust, SQL, distributed systems, profiling."),
    ]
}

fn options(dir: &std::path::Path, force: bool) -> IndexOptions {
    IndexOptions {
        index_path: dir.join("idx.sqlite"),
        fingerprint_path: dir.join("idx.sqlite.fingerprint"),
        force_recreate: force,
    }
}

#[tokio::test]
async fn build_and_query_returns_exact_match_first() {
    let dir = tempdir().unwrap();
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(MockEmbeddingProvider::new());
    let chunks = sample_chunks();

    let index = VectorIndex::open_or_build(&options(dir.path(), false), &chunks, embedder)
        .await
        .unwrap();

    assert_eq!(index.chunk_count().await.unwrap(), 3);

    // Identical text embeds identically under the mock provider, so the
    // matching chunk must rank first with maximal similarity.
    let hits = index
        .query("Skills: Rust, SQL, distributed systems, profiling.", 3)
        .await
        .unwrap();
    assert_eq!(hits.len(), 3);
    assert!(hits[0].1 >= hits[1].1 && hits[1].1 >= hits[2].1);
    assert!(hits[0].0.content.contains("Rust, SQL"));
    assert_eq!(hits[0].0.page, 3);
}

#[tokio::test]
async fn rebuild_is_deterministic_for_identical_chunks() {
    let chunks = sample_chunks();
    let query = "Education: Penn State University, Computer Science.";

    let mut rankings = Vec::new();
    for _ in 0..2 {
        let dir = tempdir().unwrap();
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(MockEmbeddingProvider::new());
        let index = VectorIndex::open_or_build(&options(dir.path(), true), &chunks, embedder)
            .await
            .unwrap();
        let ids: Vec<String> = index
            .query(query, 3)
            .await
            .unwrap()
            .into_iter()
            .map(|(record, _)| record.id)
            .collect();
        rankings.push(ids);
    }

    assert_eq!(rankings[0], rankings[1]);
    assert_eq!(rankings[0][0], "chunk-0");
}

#[tokio::test]
async fn unchanged_document_reuses_persisted_index() {
    let dir = tempdir().unwrap();
    let provider = CountingProvider::new();
    let chunks = sample_chunks();

    let first = VectorIndex::open_or_build(
        &options(dir.path(), false),
        &chunks,
        provider.clone(),
    )
    .await
    .unwrap();
    assert_eq!(first.chunk_count().await.unwrap(), 3);
    let batches_after_build = provider.batches();
    assert!(batches_after_build > 0);
    drop(first);

    let second = VectorIndex::open_or_build(
        &options(dir.path(), false),
        &chunks,
        provider.clone(),
    )
    .await
    .unwrap();
    assert_eq!(second.chunk_count().await.unwrap(), 3);
    assert_eq!(
        provider.batches(),
        batches_after_build,
        "reuse must not re-embed"
    );
}

#[tokio::test]
async fn changed_document_triggers_rebuild() {
    let dir = tempdir().unwrap();
    let provider = CountingProvider::new();

    let index = VectorIndex::open_or_build(
        &options(dir.path(), false),
        &sample_chunks(),
        provider.clone(),
    )
    .await
    .unwrap();
    drop(index);
    let batches_after_build = provider.batches();

    let mut edited = sample_chunks();
    edited.push(chunk(3, "Awards: dean's list, hackathon winner."));

    let rebuilt = VectorIndex::open_or_build(
        &options(dir.path(), false),
        &edited,
        provider.clone(),
    )
    .await
    .unwrap();

    assert!(provider.batches() > batches_after_build);
    assert_eq!(rebuilt.chunk_count().await.unwrap(), 4);
}

#[tokio::test]
async fn force_recreate_rebuilds_unchanged_index() {
    let dir = tempdir().unwrap();
    let provider = CountingProvider::new();
    let chunks = sample_chunks();

    let index = VectorIndex::open_or_build(
        &options(dir.path(), false),
        &chunks,
        provider.clone(),
    )
    .await
    .unwrap();
    drop(index);
    let batches_after_build = provider.batches();

    let forced = VectorIndex::open_or_build(
        &options(dir.path(), true),
        &chunks,
        provider.clone(),
    )
    .await
    .unwrap();

    assert!(provider.batches() > batches_after_build);
    assert_eq!(forced.chunk_count().await.unwrap(), 3);
}

#[tokio::test]
async fn changed_embedding_model_triggers_rebuild() {
    let dir = tempdir().unwrap();
    let chunks = sample_chunks();

    let first = CountingProvider::labeled("text-embedding-3-small");
    let index = VectorIndex::open_or_build(&options(dir.path(), false), &chunks, first.clone())
        .await
        .unwrap();
    drop(index);
    assert!(first.batches() > 0);

    // Same chunks, same vector width, different model: the stored vectors
    // are stale and must not be silently reused.
    let second = CountingProvider::labeled("text-embedding-3-large");
    let reopened = VectorIndex::open_or_build(&options(dir.path(), false), &chunks, second.clone())
        .await
        .unwrap();

    assert!(second.batches() > 0, "model change must re-embed");
    assert_eq!(reopened.chunk_count().await.unwrap(), 3);
}

#[tokio::test]
async fn changed_embedding_dims_trigger_rebuild() {
    let dir = tempdir().unwrap();
    let chunks = sample_chunks();

    let wide: Arc<dyn EmbeddingProvider> = Arc::new(MockEmbeddingProvider::with_dims(8));
    let index = VectorIndex::open_or_build(&options(dir.path(), false), &chunks, wide)
        .await
        .unwrap();
    drop(index);

    // A narrower width needs a fresh embedding table; reuse would only fail
    // at query time.
    let narrow: Arc<dyn EmbeddingProvider> = Arc::new(MockEmbeddingProvider::with_dims(4));
    let reopened = VectorIndex::open_or_build(&options(dir.path(), false), &chunks, narrow)
        .await
        .unwrap();

    assert_eq!(reopened.chunk_count().await.unwrap(), 3);
    let hits = reopened.query("Rust", 2).await.unwrap();
    assert!(!hits.is_empty());
}

#[tokio::test]
async fn retriever_with_blank_query_returns_placeholder_over_populated_index() {
    let dir = tempdir().unwrap();
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(MockEmbeddingProvider::new());
    let chunks = sample_chunks();

    let index = VectorIndex::open_or_build(&options(dir.path(), false), &chunks, embedder)
        .await
        .unwrap();
    assert_eq!(index.chunk_count().await.unwrap(), 3);

    let tool = RetrieverTool::new(Arc::new(index), 3);
    let output = tool.invoke("").await.unwrap();
    assert_eq!(output, NO_RESULTS_MESSAGE);
}

#[tokio::test]
async fn unreadable_store_falls_back_to_rebuild() {
    let dir = tempdir().unwrap();
    let opts = options(dir.path(), false);
    let chunks = sample_chunks();
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(MockEmbeddingProvider::new());

    // A matching fingerprint beside a corrupt database file: the reuse path
    // must detect the open failure and rebuild instead of erroring out.
    std::fs::write(&opts.index_path, b"this is not a sqlite database").unwrap();
    std::fs::write(
        &opts.fingerprint_path,
        resume_agent::index::fingerprint_chunks(&chunks, embedder.model_id(), embedder.dims()),
    )
    .unwrap();

    let index = VectorIndex::open_or_build(&opts, &chunks, embedder)
        .await
        .unwrap();
    assert_eq!(index.chunk_count().await.unwrap(), 3);
    assert!(!index.query("Rust", 2).await.unwrap().is_empty());
}

#[tokio::test]
async fn retriever_over_empty_store_returns_placeholder() {
    let dir = tempdir().unwrap();
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(MockEmbeddingProvider::new());
    let store = SqliteChunkStore::open(dir.path().join("empty.sqlite"), embedder.dims())
        .await
        .unwrap();
    let index = Arc::new(VectorIndex::from_parts(store, embedder));
    let tool = RetrieverTool::new(index, 3);

    for query in ["", "anything at all"] {
        let output = tool.invoke(query).await.unwrap();
        assert_eq!(output, NO_RESULTS_MESSAGE);
    }
}

#[tokio::test]
async fn store_rejects_mismatched_dimensions() {
    let dir = tempdir().unwrap();
    let store = SqliteChunkStore::open(dir.path().join("dims.sqlite"), 8)
        .await
        .unwrap();

    let err = store.search_similar(&[0.0; 4], 3).await.unwrap_err();
    assert!(matches!(err, RagError::Storage(_)));
}
