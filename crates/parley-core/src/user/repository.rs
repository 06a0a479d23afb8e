//! UserRepository trait definition.

use parley_types::error::RepositoryError;
use parley_types::user::User;

/// Repository trait for user persistence.
///
/// Implementations live in parley-infra (e.g., `SqliteUserRepository`).
pub trait UserRepository: Send + Sync {
    /// Insert or update a user by id. Profile fields are always refreshed;
    /// the stored refresh token is replaced only by a non-empty one.
    fn upsert(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// The stored refresh token for a user. `NotFound` if the user is absent.
    fn get_refresh_token(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<String, RepositoryError>> + Send;

    /// Delete a user and, by cascade, their conversations. `NotFound` if
    /// nothing was deleted.
    fn delete(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
