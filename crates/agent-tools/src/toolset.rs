//! Toolset presets
//!
//! One orchestrator, different registries: plain chat, search-enabled and
//! edit-enabled sessions only differ in which tools get registered.

use std::str::FromStr;

use agent_core::{AgentError, Result, ToolRegistry};

use crate::svckit::{BashTool, CodeSearchTool, EditFileTool, ListFilesTool, ReadFileTool};

/// Which tools a session offers the model
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Toolset {
    /// No tools
    Chat,
    /// read_file, list_files, bash, code_search
    Search,
    /// read_file, list_files, bash, edit_file
    #[default]
    Edit,
    /// Every tool
    All,
}

/// Tool settings shared by every preset
#[derive(Clone, Debug, Default)]
pub struct ToolOptions {
    /// Extra directory names for `list_files` to skip
    pub ignored_dirs: Vec<String>,
}

impl Toolset {
    pub const ALL: [Self; 4] = [Self::Chat, Self::Search, Self::Edit, Self::All];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Search => "search",
            Self::Edit => "edit",
            Self::All => "all",
        }
    }

    /// Build the registry for this preset, in advertisement order
    pub fn registry(self, options: &ToolOptions) -> Result<ToolRegistry> {
        let mut tools = ToolRegistry::new();
        if self == Self::Chat {
            return Ok(tools);
        }

        tools.register(ReadFileTool::new())?;
        tools.register(ListFilesTool::new().with_ignored(options.ignored_dirs.iter().cloned()))?;
        tools.register(BashTool::new())?;

        if matches!(self, Self::Search | Self::All) {
            tools.register(CodeSearchTool::new())?;
        }
        if matches!(self, Self::Edit | Self::All) {
            tools.register(EditFileTool::new())?;
        }

        tracing::debug!(toolset = self.as_str(), tools = tools.len(), "Initialized tools");
        Ok(tools)
    }
}

impl std::fmt::Display for Toolset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Toolset {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                AgentError::Config(format!(
                    "unknown toolset '{s}' (expected chat, search, edit or all)"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use agent_core::{
        Agent, Completion, ContentBlock, Conversation, LlmProvider, RecordingTranscript,
        ScriptedInput, Session, ToolAdvertisement, TurnContent,
    };
    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn test_preset_tool_order() {
        let options = ToolOptions::default();
        let names = |t: Toolset| t.registry(&options).unwrap().names();

        assert!(names(Toolset::Chat).is_empty());
        assert_eq!(names(Toolset::Search), vec!["read_file", "list_files", "bash", "code_search"]);
        assert_eq!(names(Toolset::Edit), vec!["read_file", "list_files", "bash", "edit_file"]);
        assert_eq!(
            names(Toolset::All),
            vec!["read_file", "list_files", "bash", "code_search", "edit_file"]
        );
    }

    #[test]
    fn test_parse_toolset() {
        assert_eq!("search".parse::<Toolset>().unwrap(), Toolset::Search);
        assert_eq!(" ALL ".parse::<Toolset>().unwrap(), Toolset::All);
        assert!("everything".parse::<Toolset>().is_err());
        assert_eq!(Toolset::default().to_string(), "edit");
    }

    /// Replays canned completions and keeps each conversation it was sent
    struct ScriptedProvider {
        replies: Mutex<VecDeque<Completion>>,
        seen: Mutex<Vec<Conversation>>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn send(
            &self,
            conversation: &Conversation,
            _tools: &[ToolAdvertisement],
        ) -> agent_core::Result<Completion> {
            self.seen.lock().unwrap().push(conversation.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| AgentError::Inference("script exhausted".into()))
        }
    }

    fn tool_use(id: &str, name: &str, input: Value) -> ContentBlock {
        ContentBlock::tool_use(id, name, input.as_object().cloned().unwrap())
    }

    #[tokio::test]
    async fn test_edit_then_read_in_one_response() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes/todo.txt");
        let file = file.to_str().unwrap();

        let provider = Arc::new(ScriptedProvider {
            replies: Mutex::new(VecDeque::from([
                Completion::from_blocks(vec![
                    ContentBlock::text("Writing it down."),
                    tool_use(
                        "1",
                        "edit_file",
                        json!({"path": file, "old_str": "", "new_str": "buy milk"}),
                    ),
                    tool_use(
                        "2",
                        "edit_file",
                        json!({"path": file, "old_str": "milk", "new_str": "oat milk"}),
                    ),
                    tool_use("3", "read_file", json!({"path": file})),
                ]),
                Completion::from_blocks(vec![ContentBlock::text("Saved.")]),
            ])),
            seen: Mutex::default(),
        });

        let tools = Toolset::Edit.registry(&ToolOptions::default()).unwrap();
        let agent = Agent::new(provider.clone(), Arc::new(tools));
        let mut transcript = RecordingTranscript::new();

        agent
            .run(
                &mut Session::default(),
                &mut ScriptedInput::new(["note: buy milk"]),
                &mut transcript,
            )
            .await
            .unwrap();

        let seen = provider.seen.lock().unwrap();
        let TurnContent::ToolResults(results) = &seen[1].last().unwrap().content else {
            panic!("expected tool results in second request");
        };

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| !r.is_error));
        assert_eq!(results[2].tool_use_id, "3");
        assert_eq!(results[2].content, "buy oat milk");
        assert_eq!(transcript.assistant_texts(), vec!["Writing it down.", "Saved."]);
    }
}
