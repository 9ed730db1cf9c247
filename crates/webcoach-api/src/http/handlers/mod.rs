//! HTTP request handlers for the REST API.

pub mod auth;
pub mod chat;
pub mod provider;

use axum::Json;
use axum::extract::rejection::JsonRejection;

use crate::http::error::AppError;

/// Unwrap a JSON body, turning axum's plain-text rejection into an envelope error.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::Validation(e.body_text()))
}
