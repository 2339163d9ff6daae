//! Terminal console
//!
//! Stdin line reader and an ANSI transcript. Conversation output goes to
//! stdout; diagnostics stay on stderr through tracing.

use std::io::{BufRead, Write};

use async_trait::async_trait;
use tokio::sync::mpsc;

use agent_core::{AgentEvent, InputSource, Transcript};

const RESET: &str = "\x1b[0m";
const BLUE: &str = "\x1b[94m";
const YELLOW: &str = "\x1b[93m";
const CYAN: &str = "\x1b[96m";
const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";

/// Name shown for model turns
pub const ASSISTANT_LABEL: &str = "Claude";

fn paint(color: &str, label: &str) -> String {
    format!("{color}{label}{RESET}")
}

/// Render one event as the lines the user sees, or `None` if it is silent
pub fn render(event: &AgentEvent) -> Option<String> {
    let line = match event {
        AgentEvent::SessionStarted { .. } => {
            format!("Chat with {ASSISTANT_LABEL} (use 'ctrl-c' to quit)")
        }
        AgentEvent::AssistantText(text) => format!("{}: {text}", paint(YELLOW, ASSISTANT_LABEL)),
        AgentEvent::ToolInvoked { name, input } => {
            format!("{}: {name}({input})", paint(CYAN, "tool"))
        }
        AgentEvent::ToolSucceeded { output, .. } => format!("{}: {output}", paint(GREEN, "result")),
        AgentEvent::ToolFailed { error, .. } => format!("{}: {error}", paint(RED, "error")),
        AgentEvent::InferenceFailed(error) => format!("Error: {error}"),
        AgentEvent::SessionEnded => return None,
    };
    Some(line)
}

/// Transcript that prints events to a terminal
pub struct ConsoleTranscript<W> {
    out: W,
}

impl<W: Write> ConsoleTranscript<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ConsoleTranscript<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> Transcript for ConsoleTranscript<W> {
    fn record(&mut self, event: AgentEvent) {
        let Some(line) = render(&event) else {
            return;
        };
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "Failed to write to console");
        }
    }
}

/// Reads user lines from stdin, printing the prompt first.
///
/// A plain thread does the blocking reads so an interrupt never has to wait
/// on them; the runtime only ever awaits the channel.
pub struct StdinInput {
    lines: mpsc::Receiver<String>,
}

impl StdinInput {
    pub fn new() -> Self {
        Self::from_reader(std::io::BufReader::new(std::io::stdin()))
    }

    /// Feed lines from any blocking reader
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1);
        std::thread::spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read input");
                        break;
                    }
                }
            }
        });
        Self { lines: rx }
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InputSource for StdinInput {
    async fn read_line(&mut self) -> Option<String> {
        print!("{}: ", paint(BLUE, "You"));
        if let Err(e) = std::io::stdout().flush() {
            tracing::warn!(error = %e, "Failed to flush prompt");
        }

        self.lines.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_banner() {
        let banner = render(&AgentEvent::SessionStarted { model: "m".into() }).unwrap();
        assert_eq!(banner, "Chat with Claude (use 'ctrl-c' to quit)");
    }

    #[test]
    fn test_tool_echo_uses_compact_json() {
        let line = render(&AgentEvent::ToolInvoked {
            name: "read_file".into(),
            input: json!({"path": "a.txt"}),
        })
        .unwrap();
        assert_eq!(line, "\x1b[96mtool\x1b[0m: read_file({\"path\":\"a.txt\"})");
    }

    #[test]
    fn test_result_and_error_labels() {
        let ok = render(&AgentEvent::ToolSucceeded {
            name: "bash".into(),
            output: "hi".into(),
        })
        .unwrap();
        let failed = render(&AgentEvent::ToolFailed {
            name: "bash".into(),
            error: "Command timed out after 30 seconds".into(),
        })
        .unwrap();

        assert_eq!(ok, "\x1b[92mresult\x1b[0m: hi");
        assert_eq!(failed, "\x1b[91merror\x1b[0m: Command timed out after 30 seconds");
        assert_eq!(
            render(&AgentEvent::InferenceFailed("boom".into())).unwrap(),
            "Error: boom"
        );
    }

    #[test]
    fn test_each_event_printed_once() {
        let mut transcript = ConsoleTranscript::new(Vec::new());
        transcript.record(AgentEvent::AssistantText("hello".into()));
        transcript.record(AgentEvent::AssistantText("again".into()));
        transcript.record(AgentEvent::SessionEnded);

        let printed = String::from_utf8(transcript.into_inner()).unwrap();
        assert_eq!(printed, "\x1b[93mClaude\x1b[0m: hello\n\x1b[93mClaude\x1b[0m: again\n");
    }

    #[tokio::test]
    async fn test_reader_lines_then_eof() {
        let mut input = StdinInput::from_reader(std::io::Cursor::new("first\n\nsecond\n"));

        assert_eq!(input.read_line().await.as_deref(), Some("first"));
        assert_eq!(input.read_line().await.as_deref(), Some(""));
        assert_eq!(input.read_line().await.as_deref(), Some("second"));
        assert_eq!(input.read_line().await, None);
    }
}
