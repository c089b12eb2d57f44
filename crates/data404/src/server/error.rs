use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use data404_core::AccountError;

// ==============================================================================
// Error Type
// ==============================================================================

/// Client-facing failures. The message is the whole body the client sees,
/// so `Internal` carries no detail; log the cause before constructing it.
#[derive(Debug)]
pub(crate) enum AppError {
    BadRequest(&'static str),
    Unauthorized(&'static str),
    NotFound(&'static str),
    Conflict(&'static str),
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub(super) fn map_account_error(err: AccountError) -> AppError {
    match err {
        AccountError::MissingFields => AppError::BadRequest("Missing fields"),
        AccountError::DuplicateUsername(_) => AppError::Conflict("Username already exists"),
        AccountError::DuplicateEmail(_) => AppError::Conflict("Email already registered"),
        AccountError::InvalidCredentials => {
            tracing::warn!("login rejected");
            AppError::Unauthorized("Invalid credentials")
        }
        AccountError::Internal(core) => {
            tracing::error!(error = %core, "user store failure");
            AppError::Internal
        }
    }
}
