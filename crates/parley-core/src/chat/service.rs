//! Chat orchestrator.
//!
//! ChatService turns one validated prompt into one reply: it picks the
//! provider, decides whether the conversation needs a title, loads prior
//! history, calls the model and, for signed-in callers, persists the
//! exchange. Anonymous callers are served statelessly.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, info};

use parley_types::chat::{
    ANONYMOUS_NEW_CHAT_ID, ChatId, ChatInput, ChatMessage, ChatReply, ChatSummary, ReplyText,
    UNSAVED_CHAT_ID,
};
use parley_types::error::ChatError;
use parley_types::llm::{CompletionRequest, LlmError, Message};
use parley_types::user::{Identity, User};

use super::repository::ChatRepository;
use super::title::generate_title;
use super::validation::check_input;
use crate::llm::registry::ProviderRegistry;

/// Orchestrates provider calls and conversation persistence.
///
/// Generic over `ChatRepository` so that parley-core never depends on
/// parley-infra.
pub struct ChatService<C: ChatRepository> {
    repo: C,
    providers: ProviderRegistry,
    provider_timeout: Duration,
}

impl<C: ChatRepository> ChatService<C> {
    pub fn new(repo: C, providers: ProviderRegistry, provider_timeout: Duration) -> Self {
        Self {
            repo,
            providers,
            provider_timeout,
        }
    }

    /// Handle one chat exchange.
    ///
    /// A title is generated when the caller asks for one explicitly
    /// (`id == -1`) or when a signed-in caller starts a new conversation
    /// (`id < 1`). Signed-in callers get the conversation created and the
    /// exchange appended; anonymous callers get id 0 and nothing is stored.
    pub async fn send_message(
        &self,
        identity: &Identity,
        input: ChatInput,
        api_key: Option<&str>,
    ) -> Result<ChatReply, ChatError> {
        check_input(&input).map_err(ChatError::Validation)?;
        let provider = self.providers.resolve(&input.model_type, api_key)?;
        let user = identity.user();

        let needs_title =
            input.id == ANONYMOUS_NEW_CHAT_ID || (input.id < 1 && user.is_some());

        let mut chat_id = input.id;
        let mut title = None;
        if needs_title {
            let generated = self
                .bounded(generate_title(&provider, &input.prompt, &input.model))
                .await?;
            chat_id = match user {
                Some(user) => self.repo.create_chat(&user.id, &generated).await?,
                None => UNSAVED_CHAT_ID,
            };
            debug!(chat_id, "generated conversation title");
            title = Some(generated);
        }

        let history = match user {
            Some(user) if !needs_title && chat_id >= 1 => {
                self.repo.get_messages(&user.id, chat_id).await?
            }
            _ => Vec::new(),
        };

        let mut messages: Vec<Message> = history.into_iter().map(Message::from).collect();
        messages.push(Message::from(ChatMessage::human(input.prompt.as_str())));

        let request = CompletionRequest::new(input.model.as_str(), messages);
        let response = self.bounded(provider.complete(&request)).await?;

        if let Some(user) = user {
            self.persist(user, chat_id, &input.prompt, &response.content)
                .await?;
        }

        Ok(ChatReply {
            id: chat_id,
            title,
            message: vec![ReplyText {
                text: response.content,
            }],
        })
    }

    /// The caller's conversations, most recently active first.
    pub async fn list_chats(&self, user: &User) -> Result<Vec<ChatSummary>, ChatError> {
        Ok(self.repo.list_chats(&user.id).await?)
    }

    /// Messages of one of the caller's conversations.
    pub async fn history(
        &self,
        user: &User,
        chat_id: ChatId,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        Ok(self.repo.get_messages(&user.id, chat_id).await?)
    }

    /// Delete one of the caller's conversations. Idempotent.
    pub async fn delete_chat(&self, user: &User, chat_id: ChatId) -> Result<(), ChatError> {
        self.repo.delete_chat(&user.id, chat_id).await?;
        info!(chat_id, user_id = %user.id, "chat deleted");
        Ok(())
    }

    async fn persist(
        &self,
        user: &User,
        chat_id: ChatId,
        prompt: &str,
        reply: &str,
    ) -> Result<(), ChatError> {
        self.repo
            .append_exchange(&user.id, chat_id, prompt, reply)
            .await
            .map_err(|e| {
                error!(chat_id, user_id = %user.id, error = %e, "failed to persist chat exchange");
                ChatError::from(e)
            })
    }

    /// Apply the provider deadline to one model call.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, LlmError>>,
    ) -> Result<T, ChatError> {
        match tokio::time::timeout(self.provider_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(LlmError::Timeout(self.provider_timeout).into()),
        }
    }
}
