//! # agent-tools
//!
//! The local actions a model may request during a conversation:
//!
//! | tool          | action                                              |
//! |---------------|-----------------------------------------------------|
//! | `read_file`   | read a UTF-8 file                                   |
//! | `list_files`  | recursive listing, ignored directories pruned       |
//! | `bash`        | `bash -c`, 30 s timeout                              |
//! | `code_search` | ripgrep, first 50 matching lines                    |
//! | `edit_file`   | create, append, or replace a unique occurrence      |
//!
//! Every executor returns a `ToolOutput`; failures are values, not panics.
//! [`Toolset`] picks which of them a session registers.

pub mod svckit;
pub mod toolset;

pub use toolset::{ToolOptions, Toolset};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{BashTool, CodeSearchTool, EditFileTool, ListFilesTool, ReadFileTool};
}
