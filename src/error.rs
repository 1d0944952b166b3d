use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failures that can surface at the HTTP boundary. Gateway failures are
/// absent on purpose: they degrade to empty results inside the gateway
/// and never propagate this far.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid wallet address: {0}")]
    InvalidWallet(String),

    #[error("Completion provider error: {0}")]
    Completion(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::InvalidWallet(wallet) => {
                tracing::warn!(wallet = %wallet, error_code = "INVALID_WALLET", "Invalid wallet address");
                (StatusCode::BAD_REQUEST, "INVALID_WALLET")
            }
            AppError::Completion(msg) => {
                tracing::error!(message = %msg, error_code = "COMPLETION_ERROR", "Completion provider error");
                (StatusCode::BAD_GATEWAY, "COMPLETION_ERROR")
            }
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
