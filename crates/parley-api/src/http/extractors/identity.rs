//! Caller identity extractors.
//!
//! The authentication middleware resolves every request to an [`Identity`]
//! and stores it in the request extensions. These extractors hand it to
//! handlers as an explicit argument and implement the two route-level
//! guards:
//!
//! - [`AuthenticatedUser`] rejects anonymous callers with 401.
//! - [`RequireAnonymous`] short-circuits signed-in callers by answering
//!   `200 {"user": ...}` without running the handler.

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use parley_types::user::{Identity, User};

use crate::http::error::AppError;

/// The caller, signed in or not.
pub struct CurrentIdentity(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for CurrentIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Requests only reach handlers through the authentication layer,
        // so a missing identity means the router was assembled wrongly.
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentIdentity)
            .ok_or_else(|| AppError::Internal("request identity missing".to_string()))
    }
}

/// A signed-in caller.
pub struct AuthenticatedUser(pub User);

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentIdentity(identity) = CurrentIdentity::from_request_parts(parts, state).await?;
        match identity {
            Identity::Authenticated(user) => Ok(AuthenticatedUser(user)),
            Identity::Anonymous => Err(AppError::AuthenticationRequired),
        }
    }
}

/// Passes only anonymous callers.
pub struct RequireAnonymous;

impl<S: Send + Sync> FromRequestParts<S> for RequireAnonymous {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentIdentity(identity) = CurrentIdentity::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        match identity {
            Identity::Anonymous => Ok(RequireAnonymous),
            Identity::Authenticated(user) => Err(Json(json!({ "user": user })).into_response()),
        }
    }
}
