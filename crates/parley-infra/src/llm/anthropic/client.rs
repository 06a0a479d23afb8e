//! Claude over the Anthropic Messages API.
//!
//! One POST to `/v1/messages` per completion. The key travels only in the
//! `x-api-key` header.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use parley_core::llm::LlmProvider;
use parley_types::chat::MessageRole;
use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderKind};

use super::types::{AnthropicErrorBody, AnthropicMessage, AnthropicRequest, AnthropicResponse};

const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const VERSION_HEADER: (&str, &str) = ("anthropic-version", "2023-06-01");

// No Debug: holds a credential.
pub struct AnthropicProvider {
    http: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
    default_model: String,
}

impl AnthropicProvider {
    pub fn new(
        api_key: SecretString,
        default_model: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("cannot build Anthropic HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            default_model,
        })
    }

    /// Send requests to `endpoint` instead of the public API.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn messages_body(&self, request: &CompletionRequest) -> AnthropicRequest {
        let model = match request.model.as_str() {
            "" => self.default_model.clone(),
            explicit => explicit.to_string(),
        };

        AnthropicRequest {
            model,
            max_tokens: request.max_tokens,
            messages: request
                .messages
                .iter()
                .map(|message| AnthropicMessage {
                    role: wire_role(message.role),
                    content: message.content.clone(),
                })
                .collect(),
        }
    }
}

fn wire_role(role: MessageRole) -> &'static str {
    match role {
        MessageRole::Human => "user",
        MessageRole::Assistant => "assistant",
    }
}

/// Translate a non-2xx answer. `raw` is the response body, which is
/// usually an `{"error": {...}}` envelope.
fn status_error(status: StatusCode, raw: String) -> LlmError {
    let detail = serde_json::from_str::<AnthropicErrorBody>(&raw)
        .map(|body| body.error.message)
        .unwrap_or(raw);

    match status.as_u16() {
        400 => LlmError::InvalidRequest(detail),
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            retry_after_ms: None,
        },
        // Anthropic-specific "overloaded" status.
        529 => LlmError::Overloaded(detail),
        _ => LlmError::Provider {
            message: format!("Anthropic answered {status}: {detail}"),
        },
    }
}

impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        ProviderKind::Anthropic.as_str()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let (version_name, version) = VERSION_HEADER;
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", self.api_key.expose_secret())
            .header(version_name, version)
            .json(&self.messages_body(request))
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("Anthropic request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(status_error(status, raw));
        }

        let body: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("unexpected Anthropic payload: {e}")))?;

        Ok(CompletionResponse {
            content: body.text(),
            model: body.model,
        })
    }
}
