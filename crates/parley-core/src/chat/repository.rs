//! ChatRepository trait definition.
//!
//! Titled conversations and their messages. Every operation is scoped to
//! the owning user: a conversation that belongs to someone else behaves
//! exactly like one that does not exist.

use parley_types::chat::{ChatId, ChatMessage, ChatSummary};
use parley_types::error::RepositoryError;

/// Repository trait for conversation persistence.
///
/// Implementations live in parley-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// Create a conversation for `user_id` and return its new id (`>= 1`).
    fn create_chat(
        &self,
        user_id: &str,
        title: &str,
    ) -> impl std::future::Future<Output = Result<ChatId, RepositoryError>> + Send;

    /// The user's conversations, most recently active first.
    fn list_chats(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSummary>, RepositoryError>> + Send;

    /// Messages of one conversation in chronological order. Empty when the
    /// conversation is unknown or not owned by `user_id`.
    fn get_messages(
        &self,
        user_id: &str,
        chat_id: ChatId,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Append the human prompt and the assistant reply, in that order, as
    /// one unit. Fails with `NotFound` if the conversation is not owned by
    /// `user_id`.
    fn append_exchange(
        &self,
        user_id: &str,
        chat_id: ChatId,
        prompt: &str,
        reply: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a conversation and its messages. No-op if absent or not owned.
    fn delete_chat(
        &self,
        user_id: &str,
        chat_id: ChatId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
