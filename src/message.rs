//! Conversation message types threaded through the agent state machine.

use serde::{Deserialize, Serialize};

/// A tool-invocation request emitted by the language model.
///
/// The `id` is the correlation identifier: every request must be answered by
/// exactly one tool message carrying the same id before the model runs again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Raw JSON argument object as produced by the model, e.g.
    /// `{"query": "education"}`.
    pub arguments: String,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Extracts the `query` string argument, defaulting to empty when the
    /// arguments are malformed or the field is missing.
    pub fn query_argument(&self) -> String {
        serde_json::from_str::<serde_json::Value>(&self.arguments)
            .ok()
            .and_then(|value| value.get("query").and_then(|q| q.as_str()).map(String::from))
            .unwrap_or_default()
    }
}

/// A message in the conversation, tagged with one of the four roles.
///
/// Assistant messages may carry zero or more [`ToolCall`]s; tool messages
/// carry the correlation id of the request they answer.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    /// Role of the sender; use the constants on [`Message`].
    pub role: String,
    /// Text content. Empty for assistant messages that only request tools.
    pub content: String,
    /// Tool-invocation requests attached to an assistant message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Correlation id linking a tool message back to its request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// System prompt or instruction role.
    pub const SYSTEM: &'static str = "system";
    /// User input role.
    pub const USER: &'static str = "user";
    /// Model response role.
    pub const ASSISTANT: &'static str = "assistant";
    /// Tool-result role.
    pub const TOOL: &'static str = "tool";

    #[must_use]
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    #[must_use]
    pub fn system(content: &str) -> Self {
        Self::new(Self::SYSTEM, content)
    }

    #[must_use]
    pub fn user(content: &str) -> Self {
        Self::new(Self::USER, content)
    }

    #[must_use]
    pub fn assistant(content: &str) -> Self {
        Self::new(Self::ASSISTANT, content)
    }

    /// An assistant message carrying tool-invocation requests.
    #[must_use]
    pub fn assistant_with_tool_calls(content: &str, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Self::ASSISTANT.to_string(),
            content: content.to_string(),
            tool_calls,
            tool_call_id: None,
        }
    }

    /// A tool-result message answering the request with `tool_call_id`.
    #[must_use]
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Self::TOOL.to_string(),
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    /// `true` when this message requests at least one tool invocation.
    #[must_use]
    pub fn requests_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
