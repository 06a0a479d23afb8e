use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::llm::LlmError;

/// Field-level validation failures, keyed by field name.
///
/// The first message recorded for a field wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Record `message` for `field` unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Errors from repository operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("store operation timed out")]
    Timeout,
}

/// Errors related to issuing and validating sessions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session token: {0}")]
    InvalidToken(FieldErrors),

    #[error("session not found")]
    NotFound,

    #[error("random source failure: {0}")]
    Random(String),

    #[error("session record is corrupt: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// Errors from the chat orchestrator.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid chat request: {0}")]
    Validation(FieldErrors),

    #[error("invalid provider: '{0}'")]
    InvalidProvider(String),

    #[error("provider '{0}' is not configured")]
    ProviderNotConfigured(String),

    #[error("chat not found")]
    NotFound,

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Storage(RepositoryError),
}

impl From<RepositoryError> for ChatError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ChatError::NotFound,
            other => ChatError::Storage(other),
        }
    }
}

/// Errors from the login and account flows.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid state token")]
    InvalidStateToken,

    #[error("code exchange failed: {0}")]
    CodeExchange(String),

    #[error("identity provider error: {0}")]
    Upstream(String),

    #[error("identity provider refused to revoke the grant")]
    RevocationRejected,

    #[error("user not found")]
    NotFound,

    #[error("random source failure: {0}")]
    Random(String),

    #[error(transparent)]
    Storage(RepositoryError),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AuthError::NotFound,
            other => AuthError::Storage(other),
        }
    }
}
