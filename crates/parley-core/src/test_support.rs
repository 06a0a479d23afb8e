//! In-memory fakes for the port traits, shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use parley_types::chat::{ChatId, ChatMessage, ChatSummary};
use parley_types::error::{AuthError, RepositoryError};
use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderKind};
use parley_types::user::{IdentityProfile, OAuthTokens, User};

use crate::chat::ChatRepository;
use crate::llm::{BoxLlmProvider, LlmProvider, ProviderFactory};
use crate::storage::KvStore;
use crate::user::{IdentityProvider, UserRepository};

pub fn sample_user(id: &str) -> User {
    User {
        id: id.to_string(),
        name: format!("User {id}"),
        email: format!("{id}@example.com"),
        picture: format!("https://example.com/{id}.png"),
        refresh_token: format!("refresh-{id}"),
    }
}

// --- Key-value store ---

#[derive(Clone, Default)]
pub struct FakeKvStore {
    entries: Arc<Mutex<HashMap<Vec<u8>, (String, Duration)>>>,
    gets: Arc<AtomicUsize>,
}

impl FakeKvStore {
    pub fn ttl_of(&self, key: &[u8]) -> Option<Duration> {
        self.entries.lock().get(key).map(|(_, ttl)| *ttl)
    }

    pub fn expire(&self, key: &[u8]) {
        self.entries.lock().remove(key);
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

impl KvStore for FakeKvStore {
    async fn set_with_ttl(
        &self,
        key: &[u8],
        value: &str,
        ttl: Duration,
    ) -> Result<(), RepositoryError> {
        self.entries
            .lock()
            .insert(key.to_vec(), (value.to_string(), ttl));
        Ok(())
    }

    // Yields after reading, the way a networked store hands control back
    // between the answer and the caller's next command.
    async fn get(&self, key: &[u8]) -> Result<Option<String>, RepositoryError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        let value = self.entries.lock().get(key).map(|(value, _)| value.clone());
        tokio::task::yield_now().await;
        Ok(value)
    }

    async fn delete(&self, key: &[u8]) -> Result<bool, RepositoryError> {
        Ok(self.entries.lock().remove(key).is_some())
    }
}

// --- LLM provider ---

#[derive(Clone)]
pub struct FakeProvider {
    name: String,
    default_reply: String,
    queued: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    fail: bool,
    delay: Option<Duration>,
}

impl FakeProvider {
    pub fn replying(name: &str, reply: &str) -> Self {
        Self {
            name: name.to_string(),
            default_reply: reply.to_string(),
            queued: Arc::default(),
            requests: Arc::default(),
            fail: false,
            delay: None,
        }
    }

    /// Replies in order; the last one repeats once the queue is drained.
    pub fn with_replies(name: &str, replies: &[&str]) -> Self {
        let provider = Self::replying(name, replies.last().copied().unwrap_or_default());
        provider
            .queued
            .lock()
            .extend(replies.iter().map(|r| r.to_string()));
        provider
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::replying(name, "")
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }
}

impl LlmProvider for FakeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(LlmError::Provider {
                message: "upstream exploded".to_string(),
            });
        }
        let content = self
            .queued
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());
        Ok(CompletionResponse {
            content,
            model: request.model.clone(),
        })
    }
}

#[derive(Clone, Default)]
pub struct FakeProviderFactory {
    created: Arc<Mutex<Vec<(ProviderKind, String)>>>,
}

impl FakeProviderFactory {
    pub fn created(&self) -> Vec<(ProviderKind, String)> {
        self.created.lock().clone()
    }
}

impl ProviderFactory for FakeProviderFactory {
    fn create(&self, kind: ProviderKind, api_key: &str) -> Result<BoxLlmProvider, LlmError> {
        self.created.lock().push((kind, api_key.to_string()));
        Ok(BoxLlmProvider::new(FakeProvider::replying(
            &format!("{kind}-caller-key"),
            "ok",
        )))
    }
}

// --- Chat repository ---

struct StoredChat {
    id: ChatId,
    user_id: String,
    title: String,
}

#[derive(Default)]
struct ChatState {
    chats: Vec<StoredChat>,
    messages: Vec<(ChatId, ChatMessage)>,
    calls: usize,
}

#[derive(Clone, Default)]
pub struct FakeChatRepository {
    state: Arc<Mutex<ChatState>>,
}

impl FakeChatRepository {
    pub fn seed_chat(&self, user_id: &str, title: &str, exchanges: &[(&str, &str)]) -> ChatId {
        let mut state = self.state.lock();
        let id = state.chats.len() as ChatId + 1;
        state.chats.push(StoredChat {
            id,
            user_id: user_id.to_string(),
            title: title.to_string(),
        });
        for (prompt, reply) in exchanges {
            state.messages.push((id, ChatMessage::human(*prompt)));
            state.messages.push((id, ChatMessage::assistant(*reply)));
        }
        id
    }

    pub fn messages_of(&self, chat_id: ChatId) -> Vec<ChatMessage> {
        self.state
            .lock()
            .messages
            .iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn titles_of(&self, user_id: &str) -> Vec<String> {
        self.state
            .lock()
            .chats
            .iter()
            .filter(|chat| chat.user_id == user_id)
            .map(|chat| chat.title.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls
    }

    fn owns(state: &ChatState, user_id: &str, chat_id: ChatId) -> bool {
        state
            .chats
            .iter()
            .any(|chat| chat.id == chat_id && chat.user_id == user_id)
    }
}

impl ChatRepository for FakeChatRepository {
    async fn create_chat(&self, user_id: &str, title: &str) -> Result<ChatId, RepositoryError> {
        let mut state = self.state.lock();
        state.calls += 1;
        let id = state.chats.len() as ChatId + 1;
        state.chats.push(StoredChat {
            id,
            user_id: user_id.to_string(),
            title: title.to_string(),
        });
        Ok(id)
    }

    async fn list_chats(&self, user_id: &str) -> Result<Vec<ChatSummary>, RepositoryError> {
        let mut state = self.state.lock();
        state.calls += 1;
        Ok(state
            .chats
            .iter()
            .rev()
            .filter(|chat| chat.user_id == user_id)
            .map(|chat| ChatSummary {
                id: chat.id,
                title: chat.title.clone(),
            })
            .collect())
    }

    async fn get_messages(
        &self,
        user_id: &str,
        chat_id: ChatId,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let mut state = self.state.lock();
        state.calls += 1;
        if !Self::owns(&state, user_id, chat_id) {
            return Ok(Vec::new());
        }
        Ok(state
            .messages
            .iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, message)| message.clone())
            .collect())
    }

    async fn append_exchange(
        &self,
        user_id: &str,
        chat_id: ChatId,
        prompt: &str,
        reply: &str,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock();
        state.calls += 1;
        if !Self::owns(&state, user_id, chat_id) {
            return Err(RepositoryError::NotFound);
        }
        state.messages.push((chat_id, ChatMessage::human(prompt)));
        state.messages.push((chat_id, ChatMessage::assistant(reply)));
        Ok(())
    }

    async fn delete_chat(&self, user_id: &str, chat_id: ChatId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock();
        state.calls += 1;
        if Self::owns(&state, user_id, chat_id) {
            state.chats.retain(|chat| chat.id != chat_id);
            state.messages.retain(|(id, _)| *id != chat_id);
        }
        Ok(())
    }
}

// --- Users and identity provider ---

#[derive(Clone, Default)]
pub struct FakeUserRepository {
    users: Arc<Mutex<HashMap<String, User>>>,
}

impl FakeUserRepository {
    pub fn insert(&self, user: User) {
        self.users.lock().insert(user.id.clone(), user);
    }

    pub fn refresh_token_of(&self, user_id: &str) -> Option<String> {
        self.users
            .lock()
            .get(user_id)
            .map(|user| user.refresh_token.clone())
    }
}

impl UserRepository for FakeUserRepository {
    async fn upsert(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.lock();
        let previous = users.get(&user.id).map(|u| u.refresh_token.clone());
        let mut stored = user.clone();
        if stored.refresh_token.is_empty() {
            stored.refresh_token = previous.unwrap_or_default();
        }
        users.insert(user.id.clone(), stored);
        Ok(())
    }

    async fn get_refresh_token(&self, user_id: &str) -> Result<String, RepositoryError> {
        self.refresh_token_of(user_id)
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, user_id: &str) -> Result<(), RepositoryError> {
        self.users
            .lock()
            .remove(user_id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[derive(Clone, Default)]
pub struct FakeIdentityProvider {
    exchanges: Arc<AtomicUsize>,
    revoked: Arc<Mutex<Vec<String>>>,
    refuse: Arc<AtomicBool>,
}

impl FakeIdentityProvider {
    pub fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    pub fn revoked(&self) -> Vec<String> {
        self.revoked.lock().clone()
    }

    pub fn refuse_revocation(&self) {
        self.refuse.store(true, Ordering::SeqCst);
    }
}

impl IdentityProvider for FakeIdentityProvider {
    fn authorization_url(&self, state: &str) -> Result<String, AuthError> {
        Ok(format!("https://accounts.example.com/auth?state={state}"))
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthTokens, AuthError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if code != "good-code" {
            return Err(AuthError::CodeExchange("invalid_grant".to_string()));
        }
        Ok(OAuthTokens {
            access_token: "access-1".to_string(),
            refresh_token: Some("refresh-1".to_string()),
        })
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<IdentityProfile, AuthError> {
        assert_eq!(access_token, "access-1");
        Ok(IdentityProfile {
            sub: "google-sub-1".to_string(),
            email: "g@example.com".to_string(),
            name: "Grace".to_string(),
            picture: String::new(),
        })
    }

    async fn revoke(&self, refresh_token: &str) -> Result<bool, AuthError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.revoked.lock().push(refresh_token.to_string());
        Ok(true)
    }
}
