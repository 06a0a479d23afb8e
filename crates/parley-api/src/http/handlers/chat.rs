//! Chat HTTP handlers.
//!
//! Endpoints:
//! - GET    /v1/chat       - Titles of the caller's conversations
//! - GET    /v1/chat/{id}  - Messages of one conversation
//! - POST   /v1/chat       - Send a prompt (anonymous allowed)
//! - DELETE /v1/chat       - Delete a conversation

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::{Value, json};

use parley_types::chat::{ChatId, ChatInput};

use crate::http::error::AppError;
use crate::http::extractors::{AppJson, AuthenticatedUser, CurrentIdentity};
use crate::state::AppState;

/// Header carrying a caller-supplied provider key.
const API_KEY_HEADER: &str = "api-key";

/// Request body for `POST /v1/chat`.
///
/// `id`: 0 starts a new conversation for a signed-in caller, -1 asks for a
/// title without persisting anything, and a positive value continues an
/// existing conversation.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SendMessageBody {
    pub id: ChatId,
    pub model_type: String,
    pub model: String,
    pub prompt: String,
}

impl From<SendMessageBody> for ChatInput {
    fn from(body: SendMessageBody) -> Self {
        ChatInput {
            id: body.id,
            model_type: body.model_type,
            model: body.model,
            prompt: body.prompt,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteChatBody {
    pub id: ChatId,
}

/// GET /v1/chat
pub async fn list_titles(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let titles = state.chats.list_chats(&user).await?;
    Ok(Json(json!({ "titles": titles })))
}

/// GET /v1/chat/{id}
pub async fn chat_history(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let chat_id = parse_chat_id(&id)?;
    let history = state.chats.history(&user, chat_id).await?;
    Ok(Json(json!({ "chatHistory": history })))
}

/// POST /v1/chat
pub async fn send_message(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    headers: HeaderMap,
    AppJson(body): AppJson<SendMessageBody>,
) -> Result<Json<Value>, AppError> {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty());

    let reply = state
        .chats
        .send_message(&identity, body.into(), api_key)
        .await?;
    Ok(Json(json!({ "chat": reply })))
}

/// DELETE /v1/chat
pub async fn delete_chat(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(body): AppJson<DeleteChatBody>,
) -> Result<Json<Value>, AppError> {
    state.chats.delete_chat(&user, body.id).await?;
    Ok(Json(json!({ "message": "Chat Deletion Successful!" })))
}

fn parse_chat_id(raw: &str) -> Result<ChatId, AppError> {
    match raw.parse::<ChatId>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(AppError::BadRequest("invalid ID parameter".to_string())),
    }
}
