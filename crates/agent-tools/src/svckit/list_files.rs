//! List Files Tool
//!
//! Recursive listing relative to the requested directory. Directories are
//! suffixed with `/`; ignored directory names are pruned with everything
//! below them.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use walkdir::WalkDir;

use agent_core::{
    ParamType, ParameterSchema, Tool, ToolError, ToolInput, ToolOutput, ToolSchema,
    tool::optional_str,
};

/// Directory names skipped unless configured otherwise
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[".devenv"];

/// Tool for listing a directory tree
#[derive(Debug, Clone)]
pub struct ListFilesTool {
    ignored: Vec<String>,
}

impl Default for ListFilesTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ListFilesTool {
    pub fn new() -> Self {
        Self {
            ignored: DEFAULT_IGNORED_DIRS.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Add directory names to the ignored set
    #[must_use]
    pub fn with_ignored<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.ignored.contains(&name) {
                self.ignored.push(name);
            }
        }
        self
    }

    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }
}

fn is_ignored(ignored: &[String], name: &OsStr) -> bool {
    ignored.iter().any(|i| OsStr::new(i) == name)
}

/// Blocking walk; run it off the async executor
fn list(root: &Path, ignored: &[String]) -> Result<Vec<String>, ToolError> {
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && is_ignored(ignored, e.file_name())));

    let mut entries = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| match e.into_io_error() {
            Some(io) => ToolError::from(io),
            None => ToolError::Io("filesystem loop detected".into()),
        })?;

        let relative = entry.path().strip_prefix(root).unwrap_or_else(|_| entry.path());
        let mut shown = relative.to_string_lossy().into_owned();
        if entry.file_type().is_dir() {
            shown.push('/');
        }
        entries.push(shown);
    }

    Ok(entries)
}

#[async_trait]
impl Tool for ListFilesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_files".into(),
            description: "List files and directories at a given path. \
                If no path is provided, lists files in the current directory."
                .into(),
            parameters: vec![ParameterSchema::optional(
                "path",
                ParamType::String,
                "Optional relative path to list files from. \
                 Defaults to current directory if not provided.",
            )],
        }
    }

    async fn execute(&self, input: &ToolInput) -> ToolOutput {
        let root = optional_str(input, "path").filter(|p| !p.is_empty()).unwrap_or(".");
        tracing::debug!(path = root, ignored = ?self.ignored, "Listing files");

        let root = PathBuf::from(root);
        let ignored = self.ignored.clone();
        let entries = tokio::task::spawn_blocking(move || list(&root, &ignored))
            .await
            .map_err(|e| ToolError::Fault(format!("listing task failed: {e}")))??;
        serde_json::to_string(&entries).map_err(|e| ToolError::Io(e.to_string()))
    }
}
