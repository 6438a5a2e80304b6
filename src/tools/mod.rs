//! Callable tools exposed to the language model.
//!
//! A [`Tool`] is a named capability with an argument schema and a string
//! result; the [`ToolRegistry`] maps tool names to implementations so the
//! conversation machine stays open to new tools without modification.

pub mod retriever;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::ToolSchema;
use crate::types::RagError;

pub use retriever::RetrieverTool;

/// A capability the model may invoke by name with a query string.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model addresses this tool by.
    fn name(&self) -> &str;

    /// Schema advertised to the model (name, description, argument shape).
    fn schema(&self) -> ToolSchema;

    /// Executes the tool. Failures propagate to the caller; tools do not
    /// retry internally.
    async fn invoke(&self, query: &str) -> Result<String, RagError>;
}

/// Name-to-tool mapping consulted during the Retrieving phase.
///
/// Iteration order is deterministic (sorted by name) so advertised schemas
/// are stable across runs.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its own name, replacing any previous tool with
    /// that name.
    #[must_use]
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Schemas of every registered tool, for the model invocation.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|tool| tool.schema()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}
