//! Session Management
//!
//! A session lives from program start until EOF, interrupt or a fatal
//! inference error. Nothing is persisted.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::message::{Conversation, Turn};

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single interactive session
#[derive(Clone, Debug)]
pub struct Session {
    /// Unique identifier
    pub id: SessionId,

    /// Conversation history, mutated only by the orchestrator
    conversation: Conversation,

    /// Verbose diagnostics requested
    pub verbose: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,

    /// Whether session is active
    pub active: bool,
}

impl Session {
    /// Create a new session
    pub fn new(verbose: bool) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            conversation: Conversation::new(),
            verbose,
            created_at: now,
            updated_at: now,
            active: true,
        }
    }

    /// Conversation so far
    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Append a turn and update the activity timestamp
    pub fn append(&mut self, turn: Turn) {
        self.conversation.push(turn);
        self.touch();
    }

    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// End the session
    pub fn end(&mut self) {
        self.active = false;
        self.touch();
    }

    /// Turn count
    pub fn turn_count(&self) -> usize {
        self.conversation.len()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(false)
    }
}
