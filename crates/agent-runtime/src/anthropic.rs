//! Anthropic Messages Provider
//!
//! Implementation of `LlmProvider` for the Messages API
//! (`POST /v1/messages`). Works against any base URL that speaks the same
//! protocol.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{ContentBlock, Conversation, Role, Turn, TurnContent},
    provider::{Completion, FinishReason, LlmProvider, TokenUsage},
    tool::ToolAdvertisement,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const API_VERSION: &str = "2023-06-01";

/// Anthropic provider configuration
#[derive(Clone)]
pub struct AnthropicConfig {
    /// API base URL, without the `/v1/messages` suffix
    pub base_url: String,

    /// API key sent as `x-api-key`
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Response size ceiling
    pub max_tokens: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Value of the `anthropic-version` header
    pub api_version: String,
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: 120,
            api_version: API_VERSION.into(),
        }
    }

    /// Read `BASE_URL`, `API_KEY` (or `ANTHROPIC_API_KEY`) and `MODEL_NAME`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("API_KEY")
            .or_else(|| get("ANTHROPIC_API_KEY"))
            .ok_or_else(|| AgentError::Config("API_KEY is not set".into()))?;

        let mut config = Self::new(api_key);
        if let Some(base_url) = get("BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(model) = get("MODEL_NAME") {
            config.model = model;
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolAdvertisement]>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: WireContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireContent<'a> {
    Text(&'a str),
    Blocks(Vec<WireBlock<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireBlock<'a> {
    Text {
        text: &'a str,
    },
    ToolUse {
        id: &'a str,
        name: &'a str,
        input: &'a Map<String, Value>,
    },
    ToolResult {
        tool_use_id: &'a str,
        content: &'a str,
        is_error: bool,
    },
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Deserialize)]
struct WireUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    message: String,
}

// ============================================================================
// Provider
// ============================================================================

/// Anthropic LLM provider
pub struct AnthropicProvider {
    client: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicProvider {
    /// Create from configuration
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Convert a turn to the wire format
    fn convert_turn(turn: &Turn) -> WireMessage<'_> {
        let content = match &turn.content {
            TurnContent::Text(text) => WireContent::Text(text),
            TurnContent::Blocks(blocks) => WireContent::Blocks(
                blocks
                    .iter()
                    .map(|b| match b {
                        ContentBlock::Text { text } => WireBlock::Text { text },
                        ContentBlock::ToolUse { id, name, input } => {
                            WireBlock::ToolUse { id, name, input }
                        }
                    })
                    .collect(),
            ),
            TurnContent::ToolResults(results) => WireContent::Blocks(
                results
                    .iter()
                    .map(|r| WireBlock::ToolResult {
                        tool_use_id: &r.tool_use_id,
                        content: &r.content,
                        is_error: r.is_error,
                    })
                    .collect(),
            ),
        };

        WireMessage {
            role: turn.role,
            content,
        }
    }

    fn build_request<'a>(
        &'a self,
        conversation: &'a Conversation,
        tools: &'a [ToolAdvertisement],
    ) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: conversation.turns().iter().map(Self::convert_turn).collect(),
            tools: (!tools.is_empty()).then_some(tools),
        }
    }

    /// Convert the response body into a completion, dropping unknown blocks.
    ///
    /// A `tool_use` whose input is not a JSON object makes the whole response
    /// malformed.
    fn convert_response(response: MessagesResponse, model: &str) -> Result<Completion> {
        let mut content = Vec::with_capacity(response.content.len());
        for block in response.content {
            match block {
                ResponseBlock::Text { text } => content.push(ContentBlock::Text { text }),
                ResponseBlock::ToolUse { id, name, input } => {
                    let input = match input {
                        Value::Object(map) => map,
                        Value::Null => Map::new(),
                        other => {
                            return Err(AgentError::Inference(format!(
                                "Malformed response: input for tool '{name}' is not an \
                                 object: {other}"
                            )));
                        }
                    };
                    content.push(ContentBlock::ToolUse { id, name, input });
                }
                ResponseBlock::Unsupported => {}
            }
        }

        Ok(Completion {
            content,
            model: response.model.unwrap_or_else(|| model.to_string()),
            usage: response.usage.map(|u| TokenUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
            finish_reason: response.stop_reason.as_deref().map(FinishReason::parse),
        })
    }

    /// Human-readable message for a non-success response
    fn describe_failure(status: reqwest::StatusCode, body: &str) -> String {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(ErrorEnvelope { error }) => match error.kind {
                Some(kind) => format!("{status} ({kind}): {}", error.message),
                None => format!("{status}: {}", error.message),
            },
            Err(_) if body.trim().is_empty() => status.to_string(),
            Err(_) => format!("{status}: {}", body.trim()),
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn send(
        &self,
        conversation: &Conversation,
        tools: &[ToolAdvertisement],
    ) -> Result<Completion> {
        tracing::debug!(
            model = %self.config.model,
            messages = conversation.len(),
            tools = tools.len(),
            "Making API call"
        );

        let request = self.build_request(conversation, tools);

        let response = self
            .client
            .post(self.config.endpoint())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::Inference(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = Self::describe_failure(status, &body);
            tracing::debug!(%status, "API call failed");
            return Err(AgentError::Inference(message));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Inference(format!("Malformed response: {e}")))?;

        tracing::debug!("API call successful, response received");
        Self::convert_response(body, &self.config.model)
    }
}
