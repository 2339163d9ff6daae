//! # agent-core
//!
//! Core agent logic: conversation model, tool registry and the tool-use
//! conversation loop, independent of any particular LLM provider.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │ Conversation│  │    Tools    │  │   LlmProvider       │  │
//! │  │    Loop     │──│   Registry  │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! │         │                                                    │
//! │  InputSource / Transcript (console seams)                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait keeps the loop unaware of wire formats; the
//! registry it is given decides which tools (if any) the model may call.

pub mod console;
pub mod error;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod session;
pub mod tool;

pub use console::{AgentEvent, InputSource, RecordingTranscript, ScriptedInput, Transcript};
pub use error::{AgentError, Result, ToolError};
pub use message::{ContentBlock, Conversation, Role, ToolResultBlock, Turn, TurnContent};
pub use provider::{Completion, LlmProvider};
pub use reasoning::{Agent, AgentBuilder};
pub use session::Session;
pub use tool::{
    ParamType, ParameterSchema, Tool, ToolAdvertisement, ToolInput, ToolOutput, ToolRegistry,
    ToolSchema,
};
