//! Input checks for a chat request.

use parley_types::chat::ChatInput;
use parley_types::error::FieldErrors;
use parley_types::llm::ProviderKind;

/// Validate a chat request before any provider or store is touched.
///
/// `model` may be empty (provider default); otherwise it must be one of the
/// named provider's models. With an unknown provider only an empty model
/// passes the model check, so the provider error is reported on its own.
pub fn check_input(input: &ChatInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    let provider = input.model_type.parse::<ProviderKind>().ok();

    errors.check(!input.prompt.is_empty(), "prompt", "Empty prompt");
    errors.check(provider.is_some(), "model_type", "Invalid model type");

    let model_ok = input.model.is_empty()
        || provider.is_some_and(|kind| kind.supports_model(&input.model));
    errors.check(model_ok, "model", "Invalid model");

    errors.into_result()
}
