//! Registration, login, and session handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::http::HeaderName;
use axum::http::header::SET_COOKIE;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::http::error::AppError;
use crate::http::extractors::auth::{SessionToken, clear_session_cookie, session_cookie};
use crate::http::handlers::json_body;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Body of register and login requests. Missing fields become empty strings
/// so the service reports them as invalid input.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/v1/auth/register - Create an account.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Value>>), AppError> {
    let start = Instant::now();
    let body = json_body(payload)?;

    let user = state
        .auth_service
        .register(&body.username, &body.password)
        .await?;

    let resp = ApiResponse::timed(
        json!({ "user_id": user.id, "username": user.username }),
        start,
    )
    .with_link("login", "/api/v1/auth/login");

    Ok((StatusCode::CREATED, Json(resp)))
}

/// POST /api/v1/auth/login - Verify credentials and start a session.
///
/// The token is returned in the body and as an HttpOnly cookie.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<([(HeaderName, String); 1], Json<ApiResponse<Value>>), AppError> {
    let start = Instant::now();
    let body = json_body(payload)?;

    let grant = state
        .auth_service
        .login(&body.username, &body.password)
        .await?;

    let max_age = (grant.expires_at - chrono::Utc::now()).num_seconds().max(0);
    let cookie = session_cookie(&grant.token, max_age, state.config.server.secure_cookies);

    let resp = ApiResponse::timed(
        json!({
            "user_id": grant.user.id,
            "username": grant.user.username,
            "token": grant.token,
            "expires_at": grant.expires_at,
        }),
        start,
    )
    .with_link("chats", "/api/v1/chats");

    Ok(([(SET_COOKIE, cookie)], Json(resp)))
}

/// POST /api/v1/auth/logout - End the caller's session.
pub async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> Result<([(HeaderName, String); 1], Json<ApiResponse<Value>>), AppError> {
    let start = Instant::now();
    state.auth_service.logout(&token).await?;

    let cookie = clear_session_cookie(state.config.server.secure_cookies);
    let resp = ApiResponse::timed(json!({ "message": "Logged out successfully" }), start);
    Ok(([(SET_COOKIE, cookie)], Json(resp)))
}

/// GET /api/v1/auth/check - Whether the caller holds a valid session.
pub async fn check(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let user_id = state.auth_service.authenticate(&token).await?;
    Ok(Json(ApiResponse::timed(
        json!({ "authenticated": true, "user_id": user_id }),
        start,
    )))
}

/// GET /api/v1/auth/me - The caller's account.
pub async fn me(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let user = state.auth_service.current_user(&token).await?;
    Ok(Json(ApiResponse::timed(
        json!({
            "user_id": user.id,
            "username": user.username,
            "created_at": user.created_at,
        }),
        start,
    )))
}
