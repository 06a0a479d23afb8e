//! User records and the identity attached to every request.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A user who signed in through the external identity provider.
///
/// `id` is the provider's stable subject identifier. The refresh
/// credential never leaves the process: it is skipped by serde in both
/// directions, so neither HTTP responses nor session records carry it.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub picture: String,
    #[serde(skip)]
    pub refresh_token: String,
}

impl User {
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

// Equality covers the profile only; the refresh credential is not part of
// a user's identity and is absent from session-restored records.
impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.email == other.email
            && self.picture == other.picture
    }
}

impl Eq for User {}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("picture", &self.picture)
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// The caller of a request, resolved once by the auth middleware.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    #[default]
    Anonymous,
    Authenticated(User),
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(user) => Some(user),
        }
    }
}

/// Tokens returned by the identity provider's code exchange.
#[derive(Clone, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Profile fields read from the identity provider's userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentityProfile {
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
}

impl IdentityProfile {
    /// Build the user record to upsert. An absent refresh token becomes an
    /// empty string, which the upsert treats as "keep the stored one".
    pub fn into_user(self, refresh_token: Option<String>) -> User {
        User {
            id: self.sub,
            name: self.name,
            email: self.email,
            picture: self.picture,
            refresh_token: refresh_token.unwrap_or_default(),
        }
    }
}
