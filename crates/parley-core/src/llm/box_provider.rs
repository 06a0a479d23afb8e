//! Type-erased provider handle.
//!
//! `LlmProvider` uses native async fn, so it cannot be a trait object.
//! [`ProviderDyn`] restates the one capability with a boxed future and is
//! implemented for every provider; [`BoxLlmProvider`] owns one behind a
//! `Box` so the registry can hold OpenAI, Gemini and Anthropic side by side.

use std::future::Future;
use std::pin::Pin;

use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use super::provider::LlmProvider;

type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>>;

pub trait ProviderDyn: Send + Sync {
    fn provider_name(&self) -> &str;

    fn complete_dyn<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a>;
}

impl<P: LlmProvider> ProviderDyn for P {
    fn provider_name(&self) -> &str {
        self.name()
    }

    fn complete_dyn<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(self.complete(request))
    }
}

/// A provider chosen at runtime.
pub struct BoxLlmProvider(Box<dyn ProviderDyn>);

impl std::fmt::Debug for BoxLlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BoxLlmProvider").field(&self.name()).finish()
    }
}

impl BoxLlmProvider {
    pub fn new<P: LlmProvider + 'static>(provider: P) -> Self {
        Self(Box::new(provider))
    }

    pub fn name(&self) -> &str {
        self.0.provider_name()
    }

    /// Run one completion on the wrapped provider.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        self.0.complete_dyn(request).await
    }
}
