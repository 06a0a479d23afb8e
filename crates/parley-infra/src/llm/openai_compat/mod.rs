//! Chat completions over the OpenAI wire format.
//!
//! OpenAI and Google Gemini (through its OpenAI-compatible endpoint) share
//! this adapter; only the base URL, key and default model differ.

pub mod config;

use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use backoff::ExponentialBackoff;
use secrecy::{ExposeSecret, SecretString};

use parley_core::llm::LlmProvider;
use parley_types::chat::MessageRole;
use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderKind};

use self::config::OpenAiCompatConfig;

// No Debug: the client config holds the key.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    kind: ProviderKind,
    model: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config).with_backoff(single_attempt()),
            kind: config.kind,
            model: config.model,
        }
    }

    pub fn openai(api_key: SecretString, model: &str) -> Self {
        Self::new(config::openai_defaults(api_key, model))
    }

    /// Gemini through `generativelanguage.googleapis.com/v1beta/openai`.
    pub fn gemini(api_key: SecretString, model: &str) -> Self {
        Self::new(config::gemini_defaults(api_key, model))
    }

    fn to_chat_request(&self, request: &CompletionRequest) -> CreateChatCompletionRequest {
        let messages = request
            .messages
            .iter()
            .map(|msg| match msg.role {
                MessageRole::Human => {
                    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                        content: ChatCompletionRequestUserMessageContent::Text(
                            msg.content.clone(),
                        ),
                        name: None,
                    })
                }
                MessageRole::Assistant => {
                    #[allow(deprecated)]
                    ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                        content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                            msg.content.clone(),
                        )),
                        refusal: None,
                        name: None,
                        audio: None,
                        tool_calls: None,
                        function_call: None,
                    })
                }
            })
            .collect();

        let model = match request.model.as_str() {
            "" => self.model.clone(),
            explicit => explicit.to_string(),
        };

        CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            ..Default::default()
        }
    }
}

/// The client retries 5xx and 429 answers by default. A completion is
/// exactly one upstream call.
fn single_attempt() -> ExponentialBackoff {
    ExponentialBackoff {
        max_elapsed_time: Some(Duration::ZERO),
        ..Default::default()
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let response = self
            .client
            .chat()
            .create(self.to_chat_request(request))
            .await
            .map_err(map_openai_error)?;

        // An empty choice list or a refusal leaves the reply empty.
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            model: response.model,
        })
    }
}

fn map_openai_error(err: OpenAIError) -> LlmError {
    match err {
        OpenAIError::ApiError(api) => {
            let code = api.code.as_deref().unwrap_or_default();
            let kind = api.r#type.as_deref().unwrap_or_default();
            match (code, kind) {
                ("invalid_api_key", _) | (_, "authentication_error") => {
                    LlmError::AuthenticationFailed
                }
                // Gemini reports a bad key only in the message text.
                _ if api.message.contains("API key not valid") => LlmError::AuthenticationFailed,
                ("rate_limit_exceeded", _) | (_, "rate_limit_error") => LlmError::RateLimited {
                    retry_after_ms: None,
                },
                ("server_error", _) | (_, "overloaded_error") => LlmError::Overloaded(api.message),
                _ => LlmError::Provider {
                    message: format!("{kind} {code}: {}", api.message),
                },
            }
        }
        OpenAIError::Reqwest(e) => match e.status().map(|status| status.as_u16()) {
            Some(401 | 403) => LlmError::AuthenticationFailed,
            Some(429) => LlmError::RateLimited {
                retry_after_ms: None,
            },
            _ => LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            },
        },
        OpenAIError::JSONDeserialize(_, body) => {
            LlmError::Deserialization(format!("unexpected completion payload: {body}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg),
        other => LlmError::Provider {
            message: other.to_string(),
        },
    }
}
