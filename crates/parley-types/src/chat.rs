//! Chat conversation and message types for Parley.
//!
//! A conversation ("chat") is a titled, user-owned sequence of messages.
//! Each exchange appends exactly two messages: the human prompt, then the
//! assistant reply.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Identifier of a persisted conversation. Persisted ids are always `>= 1`.
pub type ChatId = i64;

/// Sentinel request id: anonymous caller who wants a title for a new chat.
pub const ANONYMOUS_NEW_CHAT_ID: ChatId = -1;

/// Id reported back for a conversation that was never persisted.
pub const UNSAVED_CHAT_ID: ChatId = 0;

/// Author of a stored message.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('human', 'assistant'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Human,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::Human => write!(f, "human"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(MessageRole::Human),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// One stored message of a conversation, in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub text: String,
}

impl ChatMessage {
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Human,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: text.into(),
        }
    }
}

/// A conversation listed for its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: ChatId,
    pub title: String,
}

/// Text of a generated reply as returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyText {
    pub text: String,
}

/// Result of one chat exchange.
///
/// `title` is present only when this exchange generated one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub id: ChatId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub message: Vec<ReplyText>,
}

/// A validated chat request handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatInput {
    pub id: ChatId,
    pub model_type: String,
    pub model: String,
    pub prompt: String,
}
