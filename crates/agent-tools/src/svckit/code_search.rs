//! Code Search Tool
//!
//! Thin wrapper over ripgrep. No matches is a normal answer; a missing `rg`
//! binary is an error.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use agent_core::{
    ParamType, ParameterSchema, Tool, ToolError, ToolInput, ToolOutput, ToolSchema,
    tool::{optional_bool, optional_str, required_str},
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Matched lines returned before truncating
pub const MAX_MATCHES: usize = 50;

pub const NO_MATCHES: &str = "No matches found";

const RG_MISSING: &str = "ripgrep (rg) not found. Please install ripgrep first.";

/// Tool for searching code with ripgrep
#[derive(Debug, Clone)]
pub struct CodeSearchTool {
    program: String,
    prefix_args: Vec<String>,
    timeout: Duration,
}

impl Default for CodeSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeSearchTool {
    pub fn new() -> Self {
        Self {
            program: "rg".into(),
            prefix_args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use another search binary; `prefix_args` go before the generated ones
    #[must_use]
    pub fn with_program<I, S>(mut self, program: impl Into<String>, prefix_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.program = program.into();
        self.prefix_args = prefix_args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// ripgrep arguments for one search
fn search_args(
    pattern: &str,
    path: &str,
    file_type: Option<&str>,
    case_sensitive: bool,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "--line-number".into(),
        "--with-filename".into(),
        "--color=never".into(),
    ];

    if !case_sensitive {
        args.push("--ignore-case".into());
    }

    if let Some(file_type) = file_type {
        args.push("--type".into());
        args.push(file_type.into());
    }

    args.push("--".into());
    args.push(pattern.into());
    args.push(path.into());
    args
}

/// Keep the first [`MAX_MATCHES`] lines, noting how many were dropped
fn truncate_matches(output: &str) -> String {
    let lines: Vec<&str> = output.lines().collect();
    if lines.len() <= MAX_MATCHES {
        return output.to_string();
    }

    format!(
        "{}\n... (showing first {MAX_MATCHES} of {} matches)",
        lines[..MAX_MATCHES].join("\n"),
        lines.len()
    )
}

#[async_trait]
impl Tool for CodeSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "code_search".into(),
            description: "Search for code patterns using ripgrep (rg).\n\n\
                Use this to find code patterns, function definitions, variable usage, \
                or any text in the codebase.\n\
                You can search by pattern, file type, or directory."
                .into(),
            parameters: vec![
                ParameterSchema::required(
                    "pattern",
                    ParamType::String,
                    "The search pattern or regex to look for",
                ),
                ParameterSchema::optional(
                    "path",
                    ParamType::String,
                    "Optional path to search in (file or directory)",
                ),
                ParameterSchema::optional(
                    "file_type",
                    ParamType::String,
                    "Optional file extension to limit search to (e.g., 'go', 'js', 'py')",
                ),
                ParameterSchema::optional(
                    "case_sensitive",
                    ParamType::Boolean,
                    "Whether the search should be case sensitive (default: false)",
                ),
            ],
        }
    }

    async fn execute(&self, input: &ToolInput) -> ToolOutput {
        let pattern = required_str(input, "pattern")?;
        if pattern.is_empty() {
            return Err(ToolError::validation("pattern is required"));
        }
        let path = optional_str(input, "path").filter(|p| !p.is_empty()).unwrap_or(".");
        let file_type = optional_str(input, "file_type").filter(|t| !t.is_empty());
        let case_sensitive = optional_bool(input, "case_sensitive", false);

        let args = search_args(pattern, path, file_type, case_sensitive);
        tracing::debug!(program = %self.program, ?args, "Running code search");

        let child = Command::new(&self.program)
            .args(&self.prefix_args)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ToolError::not_found(RG_MISSING),
                _ => ToolError::from(e),
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ToolError::Timeout {
                what: "Search",
                secs: self.timeout.as_secs(),
            })??;

        // Exit code 1 means the search ran and found nothing
        match output.status.code() {
            Some(0) => {}
            Some(1) => return Ok(NO_MATCHES.to_string()),
            _ => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(ToolError::Io(format!("search failed: {}", stderr.trim_end())));
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(truncate_matches(stdout.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn input(value: Value) -> ToolInput {
        value.as_object().cloned().unwrap()
    }

    /// Stands in for rg: runs `script` with the generated arguments as `$@`
    fn fake_rg(script: &str) -> CodeSearchTool {
        CodeSearchTool::new().with_program("sh", ["-c", script, "rg"])
    }

    #[test]
    fn test_search_args_default_case_insensitive() {
        assert_eq!(
            search_args("fn main", ".", None, false),
            vec![
                "--line-number",
                "--with-filename",
                "--color=never",
                "--ignore-case",
                "--",
                "fn main",
                "."
            ]
        );
    }

    #[test]
    fn test_search_args_with_type_and_case() {
        assert_eq!(
            search_args("Foo", "src", Some("rust"), true),
            vec![
                "--line-number",
                "--with-filename",
                "--color=never",
                "--type",
                "rust",
                "--",
                "Foo",
                "src"
            ]
        );
    }

    #[test]
    fn test_truncation_only_past_limit() {
        let exactly: Vec<String> = (1..=50).map(|i| format!("f.rs:{i}:x")).collect();
        let exactly = exactly.join("\n");
        assert_eq!(truncate_matches(&exactly), exactly);

        let over: Vec<String> = (1..=51).map(|i| format!("f.rs:{i}:x")).collect();
        let truncated = truncate_matches(&over.join("\n"));
        let lines: Vec<&str> = truncated.lines().collect();
        assert_eq!(lines.len(), 51);
        assert_eq!(lines[49], "f.rs:50:x");
        assert_eq!(lines[50], "... (showing first 50 of 51 matches)");
    }

    #[tokio::test]
    async fn test_output_capped_at_fifty_lines() {
        let tool = fake_rg("for i in $(seq 1 60); do echo \"f.rs:$i:hit\"; done");
        let output = tool.execute(&input(json!({"pattern": "hit"}))).await.unwrap();

        assert_eq!(output.lines().count(), 51);
        assert!(output.ends_with("... (showing first 50 of 60 matches)"));
    }

    #[tokio::test]
    async fn test_arguments_reach_the_program() {
        let tool = fake_rg("echo \"$@\"");
        let request = json!({
            "pattern": "todo",
            "path": "src",
            "file_type": "py",
            "case_sensitive": true
        });
        let output = tool.execute(&input(request)).await.unwrap();

        assert_eq!(output, "--line-number --with-filename --color=never --type py -- todo src");
    }

    #[tokio::test]
    async fn test_no_matches_is_not_an_error() {
        let output = fake_rg("exit 1").execute(&input(json!({"pattern": "x"}))).await;
        assert_eq!(output, Ok(NO_MATCHES.to_string()));
    }

    #[tokio::test]
    async fn test_search_failure_is_error() {
        let err = fake_rg("echo 'regex parse error' >&2; exit 2")
            .execute(&input(json!({"pattern": "("})))
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::Io("search failed: regex parse error".into()));
    }

    #[tokio::test]
    async fn test_missing_binary_is_error() {
        let tool =
            CodeSearchTool::new().with_program("definitely-not-rg-4f1c", Vec::<String>::new());
        let err = tool.execute(&input(json!({"pattern": "x"}))).await.unwrap_err();
        assert_eq!(err, ToolError::not_found(RG_MISSING));
    }

    #[tokio::test]
    async fn test_timeout() {
        let tool = fake_rg("sleep 5").with_timeout(Duration::from_millis(200));
        let err = tool.execute(&input(json!({"pattern": "x"}))).await.unwrap_err();
        assert_eq!(err.kind(), "timeout");
    }
}
