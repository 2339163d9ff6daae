//! Edit File Tool
//!
//! Single-site string replacement. `old_str` must occur exactly once so an
//! edit never lands in more places than the model intended. An empty
//! `old_str` creates the file (with parent directories) or appends to it.

use std::path::Path;

use async_trait::async_trait;

use agent_core::{
    ParamType, ParameterSchema, Tool, ToolError, ToolInput, ToolOutput, ToolSchema,
    tool::optional_str,
};

/// Tool for editing text files
#[derive(Debug, Default)]
pub struct EditFileTool;

impl EditFileTool {
    pub const fn new() -> Self {
        Self
    }
}

async fn create_new_file(path: &Path, content: &str) -> ToolOutput {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await?;

    Ok(format!("Successfully created file {}", path.display()))
}

/// Replace the single occurrence of `old_str`, or report why not
fn replace_unique(content: &str, old_str: &str, new_str: &str) -> Result<String, ToolError> {
    match content.matches(old_str).count() {
        0 => Err(ToolError::not_found("old_str not found in file")),
        1 => Ok(content.replacen(old_str, new_str, 1)),
        count => Err(ToolError::AmbiguousMatch { count }),
    }
}

#[async_trait]
impl Tool for EditFileTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "edit_file".into(),
            description: "Make edits to a text file.\n\n\
                Replaces 'old_str' with 'new_str' in the given file. \
                'old_str' and 'new_str' MUST be different from each other.\n\n\
                If the file specified with path doesn't exist, it will be created."
                .into(),
            parameters: vec![
                ParameterSchema::required("path", ParamType::String, "The path to the file"),
                ParameterSchema::required(
                    "old_str",
                    ParamType::String,
                    "Text to search for - must match exactly and must only have one match exactly",
                ),
                ParameterSchema::required(
                    "new_str",
                    ParamType::String,
                    "Text to replace old_str with",
                ),
            ],
        }
    }

    async fn execute(&self, input: &ToolInput) -> ToolOutput {
        let path = optional_str(input, "path").unwrap_or_default();
        let old_str = optional_str(input, "old_str").unwrap_or_default();
        let new_str = optional_str(input, "new_str").unwrap_or_default();

        if path.is_empty() || old_str == new_str {
            return Err(ToolError::validation("invalid input parameters"));
        }

        let path = Path::new(path);
        if old_str.is_empty() && !tokio::fs::try_exists(path).await? {
            tracing::debug!(path = %path.display(), "Creating file");
            return create_new_file(path, new_str).await;
        }

        let old_content = tokio::fs::read_to_string(path).await?;
        let new_content = if old_str.is_empty() {
            old_content + new_str
        } else {
            replace_unique(&old_content, old_str, new_str)?
        };

        tokio::fs::write(path, new_content).await?;
        tracing::debug!(path = %path.display(), "File edited");

        Ok("OK".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn edit(path: &Path, old_str: &str, new_str: &str) -> ToolOutput {
        let input = json!({
            "path": path.to_str().unwrap(),
            "old_str": old_str,
            "new_str": new_str,
        });
        EditFileTool.execute(input.as_object().unwrap()).await
    }

    #[tokio::test]
    async fn test_create_then_append() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");

        let created = edit(&file, "", "hi").await.unwrap();
        assert_eq!(created, format!("Successfully created file {}", file.display()));
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "hi");

        assert_eq!(edit(&file, "", "hi").await, Ok("OK".into()));
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "hihi");
    }

    #[tokio::test]
    async fn test_create_makes_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("deep/er/new.rs");

        edit(&file, "", "fn main() {}\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "fn main() {}\n");
    }

    #[tokio::test]
    async fn test_unique_replacement() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lib.rs");
        edit(&file, "", "let x = 1;\nlet y = 2;\n").await.unwrap();

        assert_eq!(edit(&file, "y = 2", "y = 3").await, Ok("OK".into()));
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "let x = 1;\nlet y = 3;\n");
    }

    #[tokio::test]
    async fn test_ambiguous_match_leaves_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("dup.txt");
        std::fs::write(&file, "foo bar foo").unwrap();

        let err = edit(&file, "foo", "baz").await.unwrap_err();
        assert_eq!(err, ToolError::AmbiguousMatch { count: 2 });
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "foo bar foo");
    }

    #[tokio::test]
    async fn test_missing_old_str_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, "content").unwrap();

        let err = edit(&file, "absent", "x").await.unwrap_err();
        assert_eq!(err, ToolError::not_found("old_str not found in file"));
    }

    #[tokio::test]
    async fn test_missing_file_with_old_str_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = edit(&dir.path().join("ghost.txt"), "a", "b").await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn test_invalid_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("same.txt");

        let same = edit(&file, "x", "x").await.unwrap_err();
        assert_eq!(same, ToolError::validation("invalid input parameters"));
        assert!(!file.exists());

        let empty_path = edit(Path::new(""), "", "x").await.unwrap_err();
        assert_eq!(empty_path.kind(), "validation");
    }

    #[test]
    fn test_replace_unique() {
        assert_eq!(replace_unique("abc", "b", "B"), Ok("aBc".into()));
        assert_eq!(replace_unique("aaa", "aa", "b"), Ok("ba".into()));
        assert_eq!(replace_unique("abab", "ab", "x"), Err(ToolError::AmbiguousMatch { count: 2 }));
    }
}
