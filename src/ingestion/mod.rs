//! Ingestion utilities for turning the source document into indexable chunks.
//!
//! Three stages:
//!
//! * [`loader`] — reads the document from disk into per-page text.
//! * [`splitter`] — recursive overlapping splitter with a boundary cascade.
//! * [`chunk`] — attaches sequence index, source id, and page metadata.

pub mod chunk;
pub mod loader;
pub mod splitter;

pub use chunk::{Chunk, chunk_pages};
pub use loader::{DocumentPage, load_document};
pub use splitter::TextSplitter;
