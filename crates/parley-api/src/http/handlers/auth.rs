//! Google sign-in HTTP handlers.
//!
//! Endpoints:
//! - GET    /v1/auth/google/login     - Consent URL (anonymous only)
//! - GET    /v1/auth/google/callback  - OAuth redirect target (anonymous only)
//! - DELETE /v1/auth/google/revoke    - Revoke the grant and delete the account

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Redirect;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::http::error::AppError;
use crate::http::extractors::{AuthenticatedUser, RequireAnonymous};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CallbackParams {
    pub state: String,
    pub code: String,
}

/// GET /v1/auth/google/login
pub async fn google_login(
    State(state): State<AppState>,
    _anonymous: RequireAnonymous,
) -> Result<Json<Value>, AppError> {
    let auth_url = state.users.begin_login().await?;
    Ok(Json(json!({ "auth_url": auth_url })))
}

/// GET /v1/auth/google/callback
///
/// On success the browser is sent to the frontend with the new session
/// token in the `token` query parameter.
pub async fn google_callback(
    State(state): State<AppState>,
    _anonymous: RequireAnonymous,
    params: Result<Query<CallbackParams>, QueryRejection>,
) -> Result<Redirect, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let user = state
        .users
        .complete_login(&params.state, &params.code)
        .await?;
    let session = state
        .sessions
        .issue(&user, state.settings.session_ttl)
        .await?;

    let target = format!(
        "{}?token={}",
        state.settings.frontend_url, session.plaintext
    );
    Ok(Redirect::to(&target))
}

/// DELETE /v1/auth/google/revoke
pub async fn google_revoke(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    // TODO: drop the user's live sessions here; they currently outlive the
    // account until their TTL runs out.
    state.users.delete_account(&user.id).await?;
    Ok(Json(json!({ "message": "Account Deletion Successful" })))
}
