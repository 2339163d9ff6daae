//! # agent-runtime
//!
//! Inference providers for the rust-agent system.
//!
//! ## Providers
//!
//! - **Anthropic** (default): the Messages API, and any gateway that speaks it
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{AnthropicConfig, AnthropicProvider};
//!
//! let provider = AnthropicProvider::new(AnthropicConfig::from_env()?)?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .tools(registry)
//!     .build()?;
//! ```

#[cfg(feature = "anthropic")]
pub mod anthropic;

#[cfg(feature = "anthropic")]
pub use anthropic::{AnthropicConfig, AnthropicProvider};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, Conversation, LlmProvider, Result, Session, Tool, ToolRegistry,
};
