//! GET /user - the signed-in caller's profile.

use axum::Json;
use serde_json::{Value, json};

use crate::http::extractors::AuthenticatedUser;

pub async fn current_user(AuthenticatedUser(user): AuthenticatedUser) -> Json<Value> {
    Json(json!({ "user": user }))
}
