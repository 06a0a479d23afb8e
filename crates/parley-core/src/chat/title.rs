//! Conversation title generation via LLM.

use parley_types::chat::MessageRole;
use parley_types::llm::{CompletionRequest, LlmError, Message};

use crate::llm::box_provider::BoxLlmProvider;

const TITLE_INSTRUCTION: &str = "Based on the following initial prompt, generate a concise and descriptive title for the conversation:\n\n";

/// Ask `provider` for a title summarizing the first prompt of a conversation.
///
/// The result is trimmed of whitespace and surrounding quotes.
#[tracing::instrument(name = "generate_title", skip(provider, prompt), fields(model = %model))]
pub async fn generate_title(
    provider: &BoxLlmProvider,
    prompt: &str,
    model: &str,
) -> Result<String, LlmError> {
    let request = CompletionRequest::new(
        model,
        vec![Message {
            role: MessageRole::Human,
            content: format!("{TITLE_INSTRUCTION}{prompt}"),
        }],
    );

    let response = provider.complete(&request).await?;

    let title = response
        .content
        .trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_string();

    Ok(title)
}
