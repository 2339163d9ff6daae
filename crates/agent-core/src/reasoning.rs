//! Conversation Loop
//!
//! Drives a session: read a user line, call the model, run every tool the
//! model asks for, send the results back, and repeat until the model answers
//! without tool requests.
//!
//! ```text
//! AwaitingUserInput ──► AwaitingModelResponse ──► DispatchingTools
//!        ▲                     ▲                        │
//!        │                     └──── tool results ──────┘
//!        └────────────── response without tool use ─────┘
//! ```
//!
//! Everything runs in issue order on the calling task. Tools from one
//! response execute one at a time, in block order, because later calls may
//! depend on the side effects of earlier ones.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, warn};

use crate::console::{AgentEvent, InputSource, Transcript};
use crate::error::{AgentError, Result, ToolError};
use crate::message::{ContentBlock, ToolResultBlock, Turn};
use crate::provider::LlmProvider;
use crate::session::Session;
use crate::tool::{Tool, ToolInput, ToolOutput, ToolRegistry};

/// The orchestrator
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
}

impl Agent {
    /// Create a new agent
    pub fn new(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self { provider, tools }
    }

    /// Run the interactive loop until the input ends.
    ///
    /// Returns `Err` only for a fatal inference failure, which has already
    /// been reported to the transcript.
    pub async fn run<I, T>(
        &self,
        session: &mut Session,
        input: &mut I,
        transcript: &mut T,
    ) -> Result<()>
    where
        I: InputSource + ?Sized,
        T: Transcript + ?Sized,
    {
        debug!(
            session = %session.id,
            model = self.provider.model(),
            tools = self.tools.len(),
            "Starting chat session"
        );
        transcript.record(AgentEvent::SessionStarted {
            model: self.provider.model().to_string(),
        });

        while let Some(line) = input.read_line().await {
            if line.trim().is_empty() {
                debug!("Skipping empty message");
                continue;
            }

            debug!(input = %line, "User input received");
            session.append(Turn::user(line));

            if let Err(err) = self.respond(session, transcript).await {
                session.end();
                return Err(err);
            }
        }

        debug!("User input ended, breaking from chat loop");
        session.end();
        transcript.record(AgentEvent::SessionEnded);
        debug!(session = %session.id, "Chat session ended");
        Ok(())
    }

    /// Answer the latest user turn, looping through tool rounds until the
    /// model stops asking for tools.
    pub async fn respond<T>(&self, session: &mut Session, transcript: &mut T) -> Result<()>
    where
        T: Transcript + ?Sized,
    {
        let advertised = self.tools.advertisements();

        loop {
            debug!(
                turns = session.turn_count(),
                tools = advertised.len(),
                "Sending conversation to model"
            );

            let completion = match self.provider.send(session.conversation(), &advertised).await {
                Ok(completion) => completion,
                Err(err) => {
                    let err = match err {
                        AgentError::Inference(_) => err,
                        other => AgentError::Inference(other.to_string()),
                    };
                    debug!(error = %err, "API call failed");
                    transcript.record(AgentEvent::InferenceFailed(err.to_string()));
                    return Err(err);
                }
            };

            debug!(
                blocks = completion.content.len(),
                tool_uses = completion.tool_use_count(),
                stop = ?completion.finish_reason,
                "Received response from model"
            );

            let blocks = completion.content;
            session.append(Turn::assistant(blocks.clone()));

            let results = self.dispatch(&blocks, transcript).await;
            if results.is_empty() {
                return Ok(());
            }

            debug!(count = results.len(), "Sending tool results back to model");
            session.append(Turn::tool_results(results));
        }
    }

    /// Walk the blocks of one response in order: print text, run tools.
    ///
    /// Returns exactly one result per `ToolUse` block, in block order.
    pub async fn dispatch<T>(
        &self,
        blocks: &[ContentBlock],
        transcript: &mut T,
    ) -> Vec<ToolResultBlock>
    where
        T: Transcript + ?Sized,
    {
        let mut results = Vec::new();

        for block in blocks {
            match block {
                ContentBlock::Text { text } => {
                    transcript.record(AgentEvent::AssistantText(text.clone()));
                }
                ContentBlock::ToolUse { id, name, input } => {
                    results.push(self.invoke(id, name, input, transcript).await);
                }
            }
        }

        results
    }

    async fn invoke<T>(
        &self,
        id: &str,
        name: &str,
        input: &ToolInput,
        transcript: &mut T,
    ) -> ToolResultBlock
    where
        T: Transcript + ?Sized,
    {
        let shown = Value::Object(input.clone());
        debug!(tool = name, input = %shown, "Tool use detected");
        transcript.record(AgentEvent::ToolInvoked {
            name: name.to_string(),
            input: shown,
        });

        let outcome = match self.tools.get(name) {
            Some(tool) => {
                debug!(tool = name, "Executing tool");
                execute_guarded(tool.as_ref(), input).await
            }
            None => Err(ToolError::not_found(format!("tool '{name}' not found"))),
        };

        match outcome {
            Ok(output) => {
                debug!(tool = name, len = output.len(), "Tool execution successful");
                transcript.record(AgentEvent::ToolSucceeded {
                    name: name.to_string(),
                    output: output.clone(),
                });
                ToolResultBlock::success(id, output)
            }
            Err(err) => {
                debug!(tool = name, kind = err.kind(), error = %err, "Tool execution failed");
                let message = err.to_string();
                transcript.record(AgentEvent::ToolFailed {
                    name: name.to_string(),
                    error: message.clone(),
                });
                ToolResultBlock::failure(id, message)
            }
        }
    }
}

/// Validate and execute, turning a panic into a `Fault` result
async fn execute_guarded(tool: &dyn Tool, input: &ToolInput) -> ToolOutput {
    let run = async {
        tool.validate(input)?;
        tool.execute(input).await
    };

    AssertUnwindSafe(run).catch_unwind().await.unwrap_or_else(|panic| {
        let message = panic_message(panic.as_ref());
        warn!(error = %message, "Tool panicked");
        Err(ToolError::Fault(message))
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Builder for Agent
#[derive(Default)]
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: Arc<ToolRegistry>,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: impl Into<Arc<ToolRegistry>>) -> Self {
        self.tools = tools.into();
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, self.tools))
    }
}
