use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use data404_core::AccountError;

use super::error::{map_account_error, AppError};
use super::SharedState;

// ==============================================================================
// DTOs
// ==============================================================================

// Absent fields deserialize to `None` and are rejected as missing by the
// account layer, not by serde.
#[derive(Deserialize)]
pub(super) struct RegisterRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LoginRequest {
    login_identifier: Option<String>,
    password: Option<String>,
}

#[derive(Serialize)]
pub(super) struct RegisterResponse {
    success: bool,
    message: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LoginResponse {
    success: bool,
    message: &'static str,
    download_link: String,
}

// ==============================================================================
// Handlers
// ==============================================================================

pub(super) async fn register(
    State(state): State<SharedState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<RegisterResponse>, AppError> {
    let req: RegisterRequest = parse_body(body)?;

    let accounts = state.accounts.clone();
    run_blocking(move || {
        accounts.register(
            req.username.as_deref().unwrap_or_default(),
            req.email.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
    })
    .await?;

    Ok(Json(RegisterResponse {
        success: true,
        message: "Account created successfully",
    }))
}

pub(super) async fn login(
    State(state): State<SharedState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let req: LoginRequest = parse_body(body)?;

    let accounts = state.accounts.clone();
    let grant = run_blocking(move || {
        accounts.authenticate(
            req.login_identifier.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
    })
    .await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful",
        download_link: grant.download_link,
    }))
}

// ==============================================================================
// Helpers
// ==============================================================================

/// Account calls derive PBKDF2 keys and touch the store file; keep them off
/// the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AccountError> + Send + 'static,
    T: Send + 'static,
{
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(f))
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "account task did not complete");
            AppError::Internal
        })?
        .map_err(map_account_error)
}

/// Bodies are parsed as JSON whatever their `Content-Type`. Unreadable or
/// unparsable bodies are logged and answered with the generic 500.
fn parse_body<T: DeserializeOwned>(body: Result<Bytes, BytesRejection>) -> Result<T, AppError> {
    let bytes = body.map_err(|rejection| {
        tracing::error!(
            status = %rejection.status(),
            error = %rejection.body_text(),
            "unreadable request body"
        );
        AppError::Internal
    })?;

    serde_json::from_slice(&bytes).map_err(|err| {
        tracing::error!(error = %err, "request body is not valid JSON");
        AppError::Internal
    })
}
