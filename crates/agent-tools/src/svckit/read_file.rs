//! Read File Tool

use async_trait::async_trait;

use agent_core::{
    ParamType, ParameterSchema, Tool, ToolError, ToolInput, ToolOutput, ToolSchema,
    tool::required_str,
};

/// Tool for reading a text file
#[derive(Debug, Default)]
pub struct ReadFileTool;

impl ReadFileTool {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "read_file".into(),
            description: "Read the contents of a given relative file path. \
                Use this when you want to see what's inside a file. \
                Do not use this with directory names."
                .into(),
            parameters: vec![ParameterSchema::required(
                "path",
                ParamType::String,
                "The relative path of a file in the working directory.",
            )],
        }
    }

    async fn execute(&self, input: &ToolInput) -> ToolOutput {
        let path = required_str(input, "path")?;
        if path.is_empty() {
            return Err(ToolError::validation("path is required"));
        }

        tracing::debug!(path, "Reading file");
        Ok(tokio::fs::read_to_string(path).await?)
    }
}
