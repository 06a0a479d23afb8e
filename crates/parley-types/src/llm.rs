//! LLM request/response types for Parley.
//!
//! These types model the data shapes for provider interactions: the fixed
//! catalogue of providers and their models, completion requests and
//! responses, and error handling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chat::{ChatMessage, MessageRole};

/// Output token ceiling applied to every completion request.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

const OPENAI_MODELS: &[&str] = &[
    "gpt-4.1-nano",
    "gpt-4.1-mini",
    "gpt-4.1",
    "gpt-4o",
    "gpt-4o-mini",
    "o4-mini",
    "o3",
    "o3-mini",
    "o3-pro",
    "gpt-4.5-preview",
];

const GOOGLE_MODELS: &[&str] = &[
    "gemini-2.5-flash-preview-05-20",
    "gemini-2.5-pro-preview-06-05",
    "gemini-2.0-flash",
    "gemini-2.0-flash-lite",
];

const ANTHROPIC_MODELS: &[&str] = &[
    "claude-sonnet-4-0",
    "claude-opus-4-0",
    "claude-3-7-sonnet-latest",
    "claude-3-5-sonnet-latest",
];

/// The model providers a chat request may name.
///
/// Wire names are the display names clients send in `model_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "OpenAI")]
    OpenAi,
    #[serde(rename = "Google")]
    Google,
    #[serde(rename = "Anthropic")]
    Anthropic,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::OpenAi,
        ProviderKind::Google,
        ProviderKind::Anthropic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Google => "Google",
            ProviderKind::Anthropic => "Anthropic",
        }
    }

    /// Models accepted for this provider. The first entry is the default.
    pub fn known_models(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::OpenAi => OPENAI_MODELS,
            ProviderKind::Google => GOOGLE_MODELS,
            ProviderKind::Anthropic => ANTHROPIC_MODELS,
        }
    }

    pub fn default_model(&self) -> &'static str {
        self.known_models()[0]
    }

    pub fn supports_model(&self, model: &str) -> bool {
        self.known_models().contains(&model)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    /// Matching is exact: `"openai"` is not a provider, `"OpenAI"` is.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("invalid provider: '{s}'"))
    }
}

/// A single message in an LLM conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl From<ChatMessage> for Message {
    fn from(message: ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.text,
        }
    }
}

/// Request to an LLM provider for a completion.
///
/// An empty `model` means "use the provider's default model".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Response from an LLM provider for a non-streaming completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
}

/// Errors from LLM provider operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("provider overloaded: {0}")]
    Overloaded(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("provider did not answer within {0:?}")]
    Timeout(std::time::Duration),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
