//! Bearer-session authentication.
//!
//! Every request leaves this stage with an [`Identity`] in its extensions.
//! No `Authorization` header means anonymous; a header that is not exactly
//! `Bearer <token>`, or a token with no live session, is rejected with
//! 401 and a `WWW-Authenticate: Bearer` challenge.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use parley_types::user::Identity;

use crate::http::error::AppError;
use crate::state::AppState;

pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let mut response = match resolve_identity(&state, req.headers()).await {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    };
    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    response
}

async fn resolve_identity(state: &AppState, headers: &HeaderMap) -> Result<Identity, AppError> {
    let Some(token) = bearer_token(headers)? else {
        return Ok(Identity::Anonymous);
    };
    let user = state.sessions.validate(token).await?;
    tracing::debug!(user_id = %user.id, "request authenticated");
    Ok(Identity::Authenticated(user))
}

/// `Ok(None)` when no credential was sent.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::InvalidAuthenticationToken)?;
    if value.is_empty() {
        return Ok(None);
    }

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(Some(token)),
        _ => Err(AppError::InvalidAuthenticationToken),
    }
}
