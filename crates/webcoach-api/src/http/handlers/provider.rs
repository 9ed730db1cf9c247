//! Completion provider diagnostics.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/provider/check - Send a probe message to the provider.
///
/// Requires a session so anonymous callers cannot spend provider quota.
pub async fn check_provider(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let result = state.chat_service.check_provider().await?;
    Ok(Json(ApiResponse::timed(
        json!({
            "provider": state.chat_service.provider_name(),
            "result": result,
        }),
        start,
    )))
}
