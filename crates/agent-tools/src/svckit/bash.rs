//! Bash Tool
//!
//! Runs a command through `bash -c`. A non-zero exit is ordinary output for
//! the model, not a tool failure; only a missing command and a timeout are
//! errors.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use agent_core::{
    ParamType, ParameterSchema, Tool, ToolError, ToolInput, ToolOutput, ToolSchema,
    tool::required_str,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Tool for running shell commands
#[derive(Debug, Clone)]
pub struct BashTool {
    timeout: Duration,
}

impl Default for BashTool {
    fn default() -> Self {
        Self::new()
    }
}

impl BashTool {
    pub const fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Tool for BashTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "bash".into(),
            description: "Execute a bash command and return its output. \
                Use this to run shell commands."
                .into(),
            parameters: vec![ParameterSchema::required(
                "command",
                ParamType::String,
                "The bash command to execute.",
            )],
        }
    }

    async fn execute(&self, input: &ToolInput) -> ToolOutput {
        let command = required_str(input, "command")?;
        if command.is_empty() {
            return Err(ToolError::validation("command is required"));
        }

        tracing::debug!(command, "Executing command");

        let child = Command::new("bash")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Dropping the future on timeout drops the child, which kills it
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ToolError::Timeout {
                what: "Command",
                secs: self.timeout.as_secs(),
            })??;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(status = ?output.status.code(), "Command exited unsuccessfully");
            return Ok(format!("Command failed with error: {stderr}\nOutput: {stdout}"));
        }

        Ok(stdout.trim_end().to_string())
    }
}
