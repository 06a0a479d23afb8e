//! Provider registry for runtime provider lookup.
//!
//! Holds one long-lived provider per kind, built at startup from server-wide
//! keys and shared by every request. A caller that brings its own API key
//! gets a fresh instance from the [`ProviderFactory`] that lives only for
//! that request.

use std::collections::HashMap;
use std::sync::Arc;

use parley_types::error::ChatError;
use parley_types::llm::{LlmError, ProviderKind};

use super::box_provider::BoxLlmProvider;

/// Builds a provider instance for a given key.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, kind: ProviderKind, api_key: &str) -> Result<BoxLlmProvider, LlmError>;
}

pub struct ProviderRegistry {
    shared: HashMap<ProviderKind, Arc<BoxLlmProvider>>,
    factory: Box<dyn ProviderFactory>,
}

impl ProviderRegistry {
    /// Create an empty registry that builds per-request instances with `factory`.
    pub fn new(factory: impl ProviderFactory + 'static) -> Self {
        Self {
            shared: HashMap::new(),
            factory: Box::new(factory),
        }
    }

    /// Register the shared instance for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: ProviderKind, provider: BoxLlmProvider) {
        self.shared.insert(kind, Arc::new(provider));
    }

    /// Kinds with a shared instance.
    pub fn configured(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.shared.contains_key(kind))
            .collect()
    }

    /// Pick the provider for one request.
    ///
    /// A non-empty `api_key` always yields a new instance bound to that key;
    /// otherwise the shared instance is returned. Unknown provider names are
    /// rejected here even if input validation already ran.
    pub fn resolve(
        &self,
        model_type: &str,
        api_key: Option<&str>,
    ) -> Result<Arc<BoxLlmProvider>, ChatError> {
        let kind: ProviderKind = model_type
            .parse()
            .map_err(|_| ChatError::InvalidProvider(model_type.to_string()))?;

        match api_key.filter(|key| !key.is_empty()) {
            Some(key) => {
                let provider = self.factory.create(kind, key)?;
                tracing::debug!(provider = %kind, "built per-request provider from caller key");
                Ok(Arc::new(provider))
            }
            None => self
                .shared
                .get(&kind)
                .cloned()
                .ok_or_else(|| ChatError::ProviderNotConfigured(kind.to_string())),
        }
    }
}
