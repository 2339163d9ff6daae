//! LLM Provider Strategy Pattern
//!
//! Defines the interface the orchestrator uses to reach a hosted model,
//! allowing the loop to work with any backend (or a scripted fake in tests).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::LlmProvider;
//!
//! let provider = AnthropicProvider::new(config)?;
//! let completion = provider.send(&conversation, &tools.advertisements()).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::{ContentBlock, Conversation};
use crate::tool::ToolAdvertisement;

/// Response from one model call
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// Decoded content blocks, in provider order
    pub content: Vec<ContentBlock>,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

impl Completion {
    /// Completion with only content, as fakes produce it
    pub fn from_blocks(content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            model: String::new(),
            usage: None,
            finish_reason: None,
        }
    }

    /// Number of tool requests in this completion
    pub fn tool_use_count(&self) -> usize {
        self.content.iter().filter(|b| b.is_tool_use()).count()
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolUse,
    Other(String),
}

impl FinishReason {
    /// Map a provider stop reason string
    pub fn parse(reason: &str) -> Self {
        match reason {
            "end_turn" | "stop_sequence" | "stop" => Self::Stop,
            "max_tokens" | "length" => Self::Length,
            "tool_use" | "tool_calls" => Self::ToolUse,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Strategy trait for LLM providers
///
/// Implementations translate the conversation into their wire format, issue a
/// single request and decode the reply. Every failure comes back as
/// [`AgentError::Inference`](crate::AgentError::Inference).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model identifier used for requests
    fn model(&self) -> &str;

    /// Send the conversation, advertising `tools` when non-empty
    async fn send(
        &self,
        conversation: &Conversation,
        tools: &[ToolAdvertisement],
    ) -> Result<Completion>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_reason_parse() {
        assert_eq!(FinishReason::parse("end_turn"), FinishReason::Stop);
        assert_eq!(FinishReason::parse("max_tokens"), FinishReason::Length);
        assert_eq!(FinishReason::parse("tool_use"), FinishReason::ToolUse);
        assert_eq!(FinishReason::parse("refusal"), FinishReason::Other("refusal".into()));
    }

    #[test]
    fn test_tool_use_count() {
        let completion = Completion::from_blocks(vec![
            ContentBlock::text("checking"),
            ContentBlock::tool_use("1", "read_file", serde_json::Map::new()),
            ContentBlock::tool_use("2", "list_files", serde_json::Map::new()),
        ]);
        assert_eq!(completion.tool_use_count(), 2);
    }
}
