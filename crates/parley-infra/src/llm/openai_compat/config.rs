//! Connection settings for providers speaking the OpenAI chat completions
//! protocol.
//!
//! OpenAI itself and Google Gemini (through its OpenAI-compatible beta
//! endpoint) differ only in base URL, so each gets a small constructor
//! returning an [`OpenAiCompatConfig`].

use secrecy::SecretString;

use parley_types::llm::ProviderKind;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Which provider this endpoint serves.
    pub kind: ProviderKind,
    /// Base URL for the API.
    pub base_url: String,
    pub api_key: SecretString,
    /// Model used when a request leaves the model empty.
    pub model: String,
}

/// OpenAI at `https://api.openai.com/v1`.
pub fn openai_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        kind: ProviderKind::OpenAi,
        base_url: OPENAI_BASE_URL.into(),
        api_key,
        model: model.into(),
    }
}

/// Google Gemini through the OpenAI-compatible beta endpoint.
pub fn gemini_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        kind: ProviderKind::Google,
        base_url: GEMINI_BASE_URL.into(),
        api_key,
        model: model.into(),
    }
}
