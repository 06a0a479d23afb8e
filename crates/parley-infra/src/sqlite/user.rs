//! SQLite user repository implementation.
//!
//! Implements `UserRepository` from `parley-core` using sqlx with split
//! read/write pools.

use chrono::Utc;
use parley_core::user::UserRepository;
use parley_types::error::RepositoryError;
use parley_types::user::User;

use super::pool::DatabasePool;
use super::{bounded, query_err};

/// SQLite-backed implementation of `UserRepository`.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl UserRepository for SqliteUserRepository {
    async fn upsert(&self, user: &User) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        bounded(async {
            sqlx::query(
                r#"INSERT INTO users (id, name, email, picture, refresh_token, created_at, updated_at)
                   VALUES (?, ?, ?, ?, ?, ?, ?)
                   ON CONFLICT (id) DO UPDATE SET
                       name = excluded.name,
                       email = excluded.email,
                       picture = excluded.picture,
                       refresh_token = CASE
                           WHEN excluded.refresh_token <> '' THEN excluded.refresh_token
                           ELSE users.refresh_token
                       END,
                       updated_at = excluded.updated_at"#,
            )
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.picture)
            .bind(&user.refresh_token)
            .bind(&now)
            .bind(&now)
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;
            Ok(())
        })
        .await
    }

    async fn get_refresh_token(&self, user_id: &str) -> Result<String, RepositoryError> {
        bounded(async {
            let row: Option<(String,)> =
                sqlx::query_as("SELECT refresh_token FROM users WHERE id = ?")
                    .bind(user_id)
                    .fetch_optional(&self.pool.reader)
                    .await
                    .map_err(query_err)?;
            row.map(|(token,)| token).ok_or(RepositoryError::NotFound)
        })
        .await
    }

    async fn delete(&self, user_id: &str) -> Result<(), RepositoryError> {
        bounded(async {
            let result = sqlx::query("DELETE FROM users WHERE id = ?")
                .bind(user_id)
                .execute(&self.pool.writer)
                .await
                .map_err(query_err)?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::chat::SqliteChatRepository;
    use crate::sqlite::pool::test_helpers::test_pool;
    use parley_core::chat::ChatRepository;

    fn make_user(id: &str, refresh_token: &str) -> User {
        User {
            id: id.to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            picture: String::new(),
            refresh_token: refresh_token.to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates_profile() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool.clone());

        repo.upsert(&make_user("sub-1", "refresh-a")).await.unwrap();

        let mut renamed = make_user("sub-1", "");
        renamed.name = "Ada Lovelace".to_string();
        repo.upsert(&renamed).await.unwrap();

        let (name,): (String,) = sqlx::query_as("SELECT name FROM users WHERE id = 'sub-1'")
            .fetch_one(&pool.reader)
            .await
            .unwrap();
        assert_eq!(name, "Ada Lovelace");
        // An empty refresh token never overwrites the stored one.
        assert_eq!(repo.get_refresh_token("sub-1").await.unwrap(), "refresh-a");
    }

    #[tokio::test]
    async fn test_upsert_replaces_refresh_token_when_present() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        repo.upsert(&make_user("sub-1", "refresh-a")).await.unwrap();
        repo.upsert(&make_user("sub-1", "refresh-b")).await.unwrap();
        assert_eq!(repo.get_refresh_token("sub-1").await.unwrap(), "refresh-b");
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        assert!(matches!(
            repo.get_refresh_token("nobody").await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            repo.delete("nobody").await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_chats() {
        let pool = test_pool().await;
        let users = SqliteUserRepository::new(pool.clone());
        let chats = SqliteChatRepository::new(pool.clone());

        users.upsert(&make_user("sub-1", "r")).await.unwrap();
        let chat_id = chats.create_chat("sub-1", "Hello").await.unwrap();
        chats
            .append_exchange("sub-1", chat_id, "hi", "hey")
            .await
            .unwrap();

        users.delete("sub-1").await.unwrap();

        let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_messages")
            .fetch_one(&pool.reader)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
        assert!(chats.list_chats("sub-1").await.unwrap().is_empty());
    }
}
