//! JSON body extractor with the API's error envelope.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

use crate::http::error::AppError;

/// Maximum accepted request body, in bytes.
pub const MAX_BODY_BYTES: usize = 1_048_576;

/// Like [`axum::Json`], but malformed bodies become `400 {"error": "..."}`.
///
/// Unknown fields are rejected by `#[serde(deny_unknown_fields)]` on the
/// target types; the size limit is enforced by the router's body limit.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(e) => AppError::BadRequest(format!(
            "body contains incorrect JSON: {}",
            e.body_text().trim_start_matches("Failed to deserialize the JSON body into the target type: ")
        )),
        JsonRejection::JsonSyntaxError(_) => {
            AppError::BadRequest("body contains badly-formed JSON".to_string())
        }
        JsonRejection::MissingJsonContentType(_) => {
            AppError::BadRequest("body must be sent with Content-Type: application/json".to_string())
        }
        JsonRejection::BytesRejection(_) => {
            AppError::BadRequest(format!("body must not be larger than {MAX_BODY_BYTES} bytes"))
        }
        other => AppError::BadRequest(other.body_text()),
    }
}
