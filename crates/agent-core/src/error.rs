//! Error Types
//!
//! Two layers: [`AgentError`] for the session and orchestrator, and
//! [`ToolError`] for anything an executor can report back to the model.

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// Transport or provider failure while talking to the model
    #[error("{0}")]
    Inference(String),

    /// A tool with the same name is already registered
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Whether this error ends the session.
    ///
    /// Tool failures never reach this type during a session; only the
    /// inference adapter can end a conversation.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Inference(_))
    }
}

/// Failure reported by a tool executor.
///
/// Executors return these as values; the orchestrator turns them into
/// `is_error` tool results and the conversation carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// Bad or missing tool input
    #[error("{0}")]
    Validation(String),

    /// Missing file, tool, binary or match target
    #[error("{0}")]
    NotFound(String),

    /// Edit target occurs more than once
    #[error("old_str found {count} times in file, must be unique")]
    AmbiguousMatch { count: usize },

    /// Filesystem or subprocess failure
    #[error("{0}")]
    Io(String),

    /// Subprocess exceeded its time bound
    #[error("{what} timed out after {secs} seconds")]
    Timeout { what: &'static str, secs: u64 },

    /// Executor panicked instead of returning
    #[error("tool panicked: {0}")]
    Fault(String),
}

impl ToolError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Short category label, used in logs
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::AmbiguousMatch { .. } => "ambiguous_match",
            Self::Io(_) => "io",
            Self::Timeout { .. } => "timeout",
            Self::Fault(_) => "fault",
        }
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::Io(err.to_string()),
        }
    }
}
