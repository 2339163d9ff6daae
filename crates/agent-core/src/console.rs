//! Console Seams
//!
//! The orchestrator reads user lines from an [`InputSource`] and reports what
//! happens through a [`Transcript`]. The binary wires these to stdin and an
//! ANSI terminal; tests use [`ScriptedInput`] and [`RecordingTranscript`].

use std::collections::VecDeque;

use async_trait::async_trait;
use serde_json::Value;

/// Something the user should see, emitted once per occurrence
#[derive(Clone, Debug, PartialEq)]
pub enum AgentEvent {
    /// Session is ready for input
    SessionStarted { model: String },
    /// Text block from the model
    AssistantText(String),
    /// A tool is about to run
    ToolInvoked { name: String, input: Value },
    /// A tool returned output
    ToolSucceeded { name: String, output: String },
    /// A tool failed, or was not found
    ToolFailed { name: String, error: String },
    /// The model call failed; the session is over
    InferenceFailed(String),
    /// Session ended by EOF or interrupt
    SessionEnded,
}

/// Source of user lines
#[async_trait]
pub trait InputSource: Send {
    /// Next line without its terminator; `None` on EOF or interrupt
    async fn read_line(&mut self) -> Option<String>;
}

/// Sink for agent events
pub trait Transcript: Send {
    fn record(&mut self, event: AgentEvent);
}

/// Pre-scripted input lines, for tests and non-interactive use
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Lines not yet consumed
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn read_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }
}

/// Transcript that keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingTranscript {
    events: Vec<AgentEvent>,
}

impl RecordingTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[AgentEvent] {
        &self.events
    }

    /// All assistant text, in order
    pub fn assistant_texts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AgentEvent::AssistantText(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Transcript for RecordingTranscript {
    fn record(&mut self, event: AgentEvent) {
        self.events.push(event);
    }
}
