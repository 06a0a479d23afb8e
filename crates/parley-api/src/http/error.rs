//! Application error type mapping to HTTP status codes and the
//! `{"error": ...}` envelope.
//!
//! Server-side failures are logged here, inside the request's trace span,
//! and replaced by a generic message; their detail never reaches the client.

use axum::Json;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use parley_types::error::{AuthError, ChatError, FieldErrors, SessionError};

pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Malformed body, query or path parameter.
    BadRequest(String),
    /// Field-level validation failures.
    Validation(FieldErrors),
    /// Missing, malformed or expired bearer token.
    InvalidAuthenticationToken,
    /// The route needs a signed-in caller.
    AuthenticationRequired,
    InvalidStateToken,
    FailedCodeExchange,
    NotFound,
    MethodNotAllowed(Method),
    RateLimitExceeded,
    /// Anything the caller cannot fix. The detail is logged, not returned.
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidAuthenticationToken
            | AppError::AuthenticationRequired
            | AppError::InvalidStateToken
            | AppError::FailedCodeExchange => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> Value {
        match self {
            AppError::BadRequest(msg) => json!(msg),
            AppError::Validation(fields) => json!(fields),
            AppError::InvalidAuthenticationToken => json!("invalid or missing authentication token"),
            AppError::AuthenticationRequired => {
                json!("you must be authenticated to access this resource")
            }
            AppError::InvalidStateToken => json!("invalid state token"),
            AppError::FailedCodeExchange => json!("failed to exchange the code for the request"),
            AppError::NotFound => json!("the requested resource could not be found"),
            AppError::MethodNotAllowed(method) => {
                json!(format!("the {method} method is not supported for this resource"))
            }
            AppError::RateLimitExceeded => json!("rate limit exceeded"),
            AppError::Internal(_) => json!(SERVER_ERROR_MESSAGE),
        }
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::Validation(fields) => AppError::Validation(fields),
            ChatError::InvalidProvider(name) => {
                AppError::BadRequest(format!("unknown model provider {name:?}"))
            }
            ChatError::ProviderNotConfigured(name) => AppError::BadRequest(format!(
                "provider {name} has no server key; supply one with the Api-Key header"
            )),
            ChatError::NotFound => AppError::NotFound,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidStateToken => AppError::InvalidStateToken,
            AuthError::CodeExchange(detail) => {
                tracing::warn!(%detail, "authorization code exchange failed");
                AppError::FailedCodeExchange
            }
            AuthError::RevocationRejected => AppError::BadRequest("account deletion failed".into()),
            AuthError::NotFound => AppError::NotFound,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::InvalidToken(_) | SessionError::NotFound => {
                AppError::InvalidAuthenticationToken
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self {
            tracing::error!(error = %detail, "request failed");
        }

        let mut response = (self.status(), Json(json!({ "error": self.message() }))).into_response();
        if matches!(self, AppError::InvalidAuthenticationToken) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
