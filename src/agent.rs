//! Two-state conversation machine: Reasoning ⇄ Retrieving.
//!
//! One invocation runs the cycle until the model produces an assistant
//! message with no tool-invocation requests. The machine is deliberately an
//! explicit two-phase loop rather than a generic graph engine; two nodes do
//! not need a scheduler.

use tracing::{debug, info, warn};

use crate::llm::ChatModel;
use crate::message::Message;
use crate::tools::ToolRegistry;
use crate::types::RagError;

/// Text fed back to the model when it requests a tool that is not registered.
/// A recoverable condition: the model is expected to retry with a corrected
/// name.
pub const UNKNOWN_TOOL_MESSAGE: &str =
    "Incorrect Tool Name, Please Retry and Select tool from List of Available tools.";

/// Built-in persona prompt prepended to every model invocation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are the candidate whose resume is indexed for retrieval. You are speaking \
directly to recruiters and hiring managers about your background, skills, and \
experience.

Your role:
- Answer questions about your resume, education, projects, skills, and experience
- Use the search_resume tool to look up specific information before responding
- Always speak in first person as the candidate
- Be professional, confident, and specific

If asked about something not covered by your resume, say so politely and offer \
to discuss it further.";

/// Phase of the conversation machine within one invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Language-model turn.
    Reasoning,
    /// Tool-execution turn.
    Retrieving,
}

/// The retrieval-augmented conversation agent.
pub struct RagAgent<M: ChatModel> {
    model: M,
    tools: ToolRegistry,
    system_prompt: String,
}

impl<M: ChatModel> RagAgent<M> {
    pub fn new(model: M, tools: ToolRegistry) -> Self {
        Self {
            model,
            tools,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Replaces the built-in persona prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Runs one full machine invocation over `history`, appending every
    /// produced message, and returns the content of the final assistant
    /// message.
    ///
    /// `history` must end with the user message for this turn. Every tool
    /// call produced in a Reasoning step receives exactly one tool message
    /// (matched by correlation id, in issue order) before the next model
    /// invocation.
    pub async fn run_turn(&self, history: &mut Vec<Message>) -> Result<String, RagError> {
        let mut phase = Phase::Reasoning;

        loop {
            match phase {
                Phase::Reasoning => {
                    let mut messages = Vec::with_capacity(history.len() + 1);
                    messages.push(Message::system(&self.system_prompt));
                    messages.extend(history.iter().cloned());

                    let reply = self.model.complete(&messages, &self.tools.schemas()).await?;
                    let requests = reply.tool_calls.len();
                    let done = !reply.requests_tools();
                    debug!(requests, done, "reasoning step complete");
                    history.push(reply);

                    if done {
                        let answer = history
                            .last()
                            .map(|message| message.content.clone())
                            .unwrap_or_default();
                        info!(turn_messages = history.len(), "turn complete");
                        return Ok(answer);
                    }
                    phase = Phase::Retrieving;
                }
                Phase::Retrieving => {
                    let pending = history
                        .last()
                        .map(|message| message.tool_calls.clone())
                        .unwrap_or_default();

                    for call in pending {
                        let output = match self.tools.get(&call.name) {
                            None => {
                                warn!(tool = %call.name, "model requested unknown tool");
                                UNKNOWN_TOOL_MESSAGE.to_string()
                            }
                            Some(tool) => tool.invoke(&call.query_argument()).await?,
                        };
                        history.push(Message::tool_result(call.id, output));
                    }
                    phase = Phase::Reasoning;
                }
            }
        }
    }
}
