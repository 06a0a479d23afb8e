//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `parley-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, and ownership checks
//! folded into each statement's WHERE clause.

use chrono::Utc;
use parley_core::chat::ChatRepository;
use parley_types::chat::{ChatId, ChatMessage, ChatSummary, MessageRole};
use parley_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{bounded, query_err};

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct MessageRow {
    role: String,
    content: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            role: row.try_get("role")?,
            content: row.try_get("content")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        Ok(ChatMessage {
            role,
            text: self.content,
        })
    }
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_chat(&self, user_id: &str, title: &str) -> Result<ChatId, RepositoryError> {
        bounded(async {
            let (id,): (i64,) = sqlx::query_as(
                "INSERT INTO chats (user_id, title, created_at) VALUES (?, ?, ?) RETURNING id",
            )
            .bind(user_id)
            .bind(title)
            .bind(Utc::now().to_rfc3339())
            .fetch_one(&self.pool.writer)
            .await
            .map_err(query_err)?;
            Ok(id)
        })
        .await
    }

    async fn list_chats(&self, user_id: &str) -> Result<Vec<ChatSummary>, RepositoryError> {
        bounded(async {
            let rows = sqlx::query(
                r#"SELECT c.id, c.title
                   FROM chats c
                   LEFT JOIN chat_messages m ON m.chat_id = c.id
                   WHERE c.user_id = ?
                   GROUP BY c.id
                   ORDER BY COALESCE(MAX(m.id), 0) DESC, c.id DESC"#,
            )
            .bind(user_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;

            let mut chats = Vec::with_capacity(rows.len());
            for row in &rows {
                chats.push(ChatSummary {
                    id: row.try_get("id").map_err(query_err)?,
                    title: row.try_get("title").map_err(query_err)?,
                });
            }
            Ok(chats)
        })
        .await
    }

    async fn get_messages(
        &self,
        user_id: &str,
        chat_id: ChatId,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        bounded(async {
            let rows = sqlx::query(
                r#"SELECT m.role, m.content
                   FROM chat_messages m
                   JOIN chats c ON c.id = m.chat_id
                   WHERE m.chat_id = ? AND c.user_id = ?
                   ORDER BY m.id ASC"#,
            )
            .bind(chat_id)
            .bind(user_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;

            let mut messages = Vec::with_capacity(rows.len());
            for row in &rows {
                let message_row = MessageRow::from_row(row).map_err(query_err)?;
                messages.push(message_row.into_message()?);
            }
            Ok(messages)
        })
        .await
    }

    async fn append_exchange(
        &self,
        user_id: &str,
        chat_id: ChatId,
        prompt: &str,
        reply: &str,
    ) -> Result<(), RepositoryError> {
        bounded(async {
            let now = Utc::now().to_rfc3339();
            let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

            let owned: Option<(i64,)> =
                sqlx::query_as("SELECT id FROM chats WHERE id = ? AND user_id = ?")
                    .bind(chat_id)
                    .bind(user_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(query_err)?;
            if owned.is_none() {
                return Err(RepositoryError::NotFound);
            }

            for (role, content) in [(MessageRole::Human, prompt), (MessageRole::Assistant, reply)] {
                sqlx::query(
                    "INSERT INTO chat_messages (chat_id, role, content, created_at) VALUES (?, ?, ?, ?)",
                )
                .bind(chat_id)
                .bind(role.to_string())
                .bind(content)
                .bind(&now)
                .execute(&mut *tx)
                .await
                .map_err(query_err)?;
            }

            tx.commit().await.map_err(query_err)?;
            Ok(())
        })
        .await
    }

    async fn delete_chat(&self, user_id: &str, chat_id: ChatId) -> Result<(), RepositoryError> {
        bounded(async {
            sqlx::query("DELETE FROM chats WHERE id = ? AND user_id = ?")
                .bind(chat_id)
                .bind(user_id)
                .execute(&self.pool.writer)
                .await
                .map_err(query_err)?;
            Ok(())
        })
        .await
    }
}
