//! Retrieval tool backed by the vector index.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::Tool;
use crate::index::VectorIndex;
use crate::llm::ToolSchema;
use crate::llm::openai::query_parameters_schema;
use crate::stores::Backend;
use crate::types::RagError;

/// Name the model addresses the retriever by.
pub const RETRIEVER_TOOL_NAME: &str = "search_resume";

/// Fixed text returned when nothing matches, so the model always receives
/// actionable output instead of an empty string.
pub const NO_RESULTS_MESSAGE: &str = "I found no relevant information in my resume for that \
     query. Please try rephrasing your question or ask about a different topic.";

const SEPARATOR: &str = "\n\n---\n\n";

/// Searches the resume index and renders the top matches as labeled blocks.
pub struct RetrieverTool<B: Backend> {
    index: Arc<VectorIndex<B>>,
    top_k: usize,
}

impl<B: Backend> RetrieverTool<B> {
    pub fn new(index: Arc<VectorIndex<B>>, top_k: usize) -> Self {
        Self {
            index,
            top_k: top_k.max(1),
        }
    }
}

#[async_trait]
impl<B: Backend + 'static> Tool for RetrieverTool<B> {
    fn name(&self) -> &str {
        RETRIEVER_TOOL_NAME
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: RETRIEVER_TOOL_NAME.to_string(),
            description: "Searches the resume for relevant passages. Use this to find \
                          specific details about education, skills, projects, or \
                          experience before answering."
                .to_string(),
            parameters: query_parameters_schema(),
        }
    }

    async fn invoke(&self, query: &str) -> Result<String, RagError> {
        // A blank query carries nothing to embed; embedding services reject
        // empty input outright. Answer with the placeholder instead of
        // surfacing an error into the conversation.
        if query.trim().is_empty() {
            debug!("blank retrieval query short-circuited");
            return Ok(NO_RESULTS_MESSAGE.to_string());
        }

        let hits = self.index.query(query, self.top_k).await?;
        debug!(query, hits = hits.len(), "retrieval executed");

        if hits.is_empty() {
            return Ok(NO_RESULTS_MESSAGE.to_string());
        }

        let blocks: Vec<String> = hits
            .iter()
            .map(|(record, _score)| {
                format!("Relevant Information (Page {}):\n{}", record.page, record.content)
            })
            .collect();
        Ok(blocks.join(SEPARATOR))
    }
}
