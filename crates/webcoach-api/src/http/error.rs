//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::http::response::{ApiErrorDetail, ApiResponse};

use webcoach_types::error::{AuthError, ChatError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Chat engine errors.
    Chat(ChatError),
    /// Registration, login, and identity errors.
    Auth(AuthError),
    /// Malformed request body.
    Validation(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl AppError {
    /// Status, machine-readable code, client-facing message, optional details.
    fn parts(&self) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
        match self {
            AppError::Auth(AuthError::Unauthenticated) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
                None,
            ),
            AppError::Chat(ChatError::InvalidInput(msg))
            | AppError::Auth(AuthError::InvalidInput(msg))
            | AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Chat(ChatError::NotFound) => (
                StatusCode::NOT_FOUND,
                "CHAT_NOT_FOUND",
                "Chat not found".to_string(),
                None,
            ),
            AppError::Chat(ChatError::Provider(e)) => (
                StatusCode::BAD_GATEWAY,
                "PROVIDER_ERROR",
                e.to_string(),
                Some(json!({ "kind": e.kind() })),
            ),
            AppError::Chat(ChatError::Storage(_)) | AppError::Auth(AuthError::Storage(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "Internal storage error".to_string(),
                None,
            ),
            AppError::Auth(AuthError::UsernameTaken) => (
                StatusCode::CONFLICT,
                "USERNAME_TAKEN",
                "Username already exists".to_string(),
                None,
            ),
            AppError::Auth(AuthError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid username or password".to_string(),
                None,
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), code, error = ?self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), code, "Request rejected");
        }

        let body = ApiResponse::error(ApiErrorDetail {
            code: code.to_string(),
            message,
            details,
        });

        (status, Json(body)).into_response()
    }
}
