//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sigil_core::error::SigilError;

/// Wrapper turning domain errors into HTTP responses.
pub struct ApiError(SigilError);

impl From<SigilError> for ApiError {
    fn from(err: SigilError) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            SigilError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
            SigilError::Conflict { entity } => {
                (StatusCode::CONFLICT, format!("{entity} already exists"))
            }
            SigilError::AuthenticationFailed { reason } => {
                (StatusCode::UNAUTHORIZED, reason.clone())
            }
            SigilError::NotFound { entity, .. } => {
                (StatusCode::NOT_FOUND, format!("{entity} not found"))
            }
            // Storage and crypto details stay out of responses.
            other => {
                tracing::error!(error = %other, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = ErrorBody {
            status: status.as_u16(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
