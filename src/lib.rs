//! Retrieval-augmented resume chat agent.
//!
//! ```text
//! resume.md ──► ingestion::loader ──► ingestion::splitter ──► Chunks
//!                                                               │
//!                embeddings::EmbeddingProvider ◄────────────────┤
//!                              │                                │
//!                              ▼                                ▼
//!                index::VectorIndex ──► stores::SqliteChunkStore (sqlite-vec)
//!                              │
//!                              ▼
//! repl ──► agent::RagAgent {Reasoning ⇄ Retrieving} ──► llm::ChatModel
//!                              │
//!                              └──► tools::RetrieverTool
//! ```
//!
//! One interactive turn runs the two-phase machine to completion: the model
//! reasons over the history, optionally calls the retrieval tool (each
//! request answered by exactly one correlated tool message), and terminates
//! when it answers without requesting tools.

pub mod agent;
pub mod config;
pub mod embeddings;
pub mod index;
pub mod ingestion;
pub mod llm;
pub mod message;
pub mod repl;
pub mod stores;
pub mod tools;
pub mod types;

pub use agent::{DEFAULT_SYSTEM_PROMPT, RagAgent, UNKNOWN_TOOL_MESSAGE};
pub use config::Settings;
pub use embeddings::{EmbeddingProvider, MockEmbeddingProvider, OpenAiEmbeddingProvider};
pub use index::{IndexOptions, VectorIndex};
pub use ingestion::{Chunk, TextSplitter, chunk_pages, load_document};
pub use llm::{ChatModel, OpenAiChatModel, ToolSchema};
pub use message::{Message, ToolCall};
pub use stores::{Backend, ChunkRecord, SqliteChunkStore};
pub use tools::{RetrieverTool, Tool, ToolRegistry};
pub use types::RagError;
