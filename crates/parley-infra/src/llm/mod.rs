//! LLM provider implementations.
//!
//! Contains the concrete [`LlmProvider`](parley_core::llm::LlmProvider)
//! implementations (Anthropic, plus OpenAI and Gemini over the
//! OpenAI-compatible protocol), a factory ([`create_provider`]) that builds
//! the right one for a [`ProviderKind`], and [`build_registry`] which wires
//! the server-wide keys into a [`ProviderRegistry`] at startup.

pub mod anthropic;
pub mod openai_compat;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use parley_core::llm::{BoxLlmProvider, ProviderFactory, ProviderRegistry};
use parley_types::config::ServerConfig;
use parley_types::llm::{LlmError, ProviderKind};

use self::anthropic::AnthropicProvider;
use self::openai_compat::OpenAiCompatibleProvider;

/// Create a [`BoxLlmProvider`] for `kind` bound to `api_key`.
///
/// The provider's default model (used when a request leaves the model
/// empty) is the first entry of the kind's known model list.
pub fn create_provider(
    kind: ProviderKind,
    api_key: SecretString,
    timeout: Duration,
) -> Result<BoxLlmProvider, LlmError> {
    if api_key.expose_secret().is_empty() {
        return Err(LlmError::AuthenticationFailed);
    }

    let model = kind.default_model();
    let provider = match kind {
        ProviderKind::Anthropic => {
            BoxLlmProvider::new(AnthropicProvider::new(api_key, model.to_string(), timeout)?)
        }
        ProviderKind::OpenAi => BoxLlmProvider::new(OpenAiCompatibleProvider::openai(api_key, model)),
        ProviderKind::Google => BoxLlmProvider::new(OpenAiCompatibleProvider::gemini(api_key, model)),
    };
    Ok(provider)
}

/// Builds real HTTP providers for callers that bring their own key.
pub struct HttpProviderFactory {
    timeout: Duration,
}

impl HttpProviderFactory {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn create(&self, kind: ProviderKind, api_key: &str) -> Result<BoxLlmProvider, LlmError> {
        create_provider(kind, SecretString::from(api_key.to_string()), self.timeout)
    }
}

/// Build the registry from the server-wide provider keys.
///
/// Kinds without a key are left unregistered: requests for them succeed
/// only when the caller supplies an `Api-Key`.
pub fn build_registry(config: &ServerConfig) -> Result<ProviderRegistry, LlmError> {
    let timeout = config.provider_timeout();
    let mut registry = ProviderRegistry::new(HttpProviderFactory::new(timeout));

    let keys = [
        (ProviderKind::OpenAi, &config.providers.openai_api_key),
        (ProviderKind::Google, &config.providers.gemini_api_key),
        (ProviderKind::Anthropic, &config.providers.anthropic_api_key),
    ];

    for (kind, key) in keys {
        match key {
            Some(key) if !key.expose_secret().is_empty() => {
                registry.register(kind, create_provider(kind, key.clone(), timeout)?);
                info!(provider = %kind, "shared provider configured");
            }
            _ => warn!(provider = %kind, "no server key; provider requires a caller Api-Key"),
        }
    }

    Ok(registry)
}
