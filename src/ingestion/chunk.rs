//! Chunk model and page-to-chunk conversion.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::loader::DocumentPage;
use super::splitter::TextSplitter;

/// A bounded span of source text with positional metadata, created once at
/// ingestion time and immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    /// Zero-based position of this chunk within the whole document.
    pub chunk_index: usize,
    /// Source identifier (collection name) shared by all chunks of a document.
    pub source: String,
    /// 1-based page the chunk originated from.
    pub page: usize,
}

/// Splits every page and numbers the resulting chunks document-wide.
///
/// Chunk order follows page order, then offset order within each page, so the
/// sequence reads front to back.
pub fn chunk_pages(pages: &[DocumentPage], splitter: &TextSplitter, source: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for page in pages {
        for piece in splitter.split(&page.text) {
            chunks.push(Chunk {
                id: Uuid::new_v4().to_string(),
                text: piece.text,
                chunk_index: chunks.len(),
                source: source.to_string(),
                page: page.number,
            });
        }
    }
    info!(
        source,
        pages = pages.len(),
        chunks = chunks.len(),
        "document chunked"
    );
    chunks
}
