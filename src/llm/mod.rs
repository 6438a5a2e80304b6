//! Language-model abstraction: the [`ChatModel`] trait plus tool schemas.
//!
//! The agent only needs one operation — "given the message history and the
//! available tools, produce the next assistant message" — so that is the
//! whole trait. The shipped implementation talks to an OpenAI-compatible
//! chat-completions endpoint; tests substitute a scripted model.

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::Message;
use crate::types::RagError;

pub use openai::OpenAiChatModel;

/// JSON-schema description of a callable tool, advertised to the model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// JSON Schema of the argument object.
    pub parameters: Value,
}

/// A chat-completion model that may answer with text, tool-invocation
/// requests, or both.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Produces the next assistant message for `messages`, with `tools`
    /// available for invocation.
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
    ) -> Result<Message, RagError>;
}
