//! Chat session handlers: create, list, message, history, delete.

use std::time::Instant;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;
use webcoach_types::chat::{SessionSummary, Turn};
use webcoach_types::error::ChatError;

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::handlers::json_body;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Body of POST /chats/{id}/messages.
#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    #[serde(default)]
    pub message: String,
}

/// Listing entry in GET /chats.
#[derive(Debug, Serialize)]
pub struct ChatListItem {
    pub chat_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_message: Option<String>,
}

impl From<SessionSummary> for ChatListItem {
    fn from(s: SessionSummary) -> Self {
        Self {
            chat_id: s.id,
            created_at: s.created_at,
            last_message: s.last_user_text,
        }
    }
}

/// One turn in GET /chats/{id}/history.
#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub user_message: String,
    pub ai_response: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl From<Turn> for HistoryItem {
    fn from(t: Turn) -> Self {
        Self {
            user_message: t.user_text,
            ai_response: t.ai_text,
            timestamp: t.timestamp,
        }
    }
}

/// A path segment that is not a UUID cannot name a chat the caller owns.
fn parse_chat_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Chat(ChatError::NotFound))
}

/// POST /api/v1/chats - Create an empty chat session.
pub async fn create_chat(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<(StatusCode, Json<ApiResponse<Value>>), AppError> {
    let start = Instant::now();
    let chat_id = state.chat_service.create_session(&user.user_id).await?;

    let resp = ApiResponse::timed(json!({ "chat_id": chat_id }), start)
        .with_link("messages", &format!("/api/v1/chats/{chat_id}/messages"))
        .with_link("history", &format!("/api/v1/chats/{chat_id}/history"));

    Ok((StatusCode::CREATED, Json(resp)))
}

/// GET /api/v1/chats - List the caller's chat sessions.
pub async fn list_chats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let chats: Vec<ChatListItem> = state
        .chat_service
        .list_sessions(&user.user_id)
        .await?
        .into_iter()
        .map(ChatListItem::from)
        .collect();

    Ok(Json(
        ApiResponse::timed(json!({ "chats": chats }), start).with_link("self", "/api/v1/chats"),
    ))
}

/// POST /api/v1/chats/{id}/messages - Send a message and get the coach's reply.
pub async fn send_message(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<SendMessageBody>, JsonRejection>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let chat_id = parse_chat_id(&id)?;
    let body = json_body(payload)?;

    let reply = state
        .chat_service
        .send_message(&chat_id, &user.user_id, &body.message)
        .await?;

    Ok(Json(ApiResponse::timed(
        json!({ "ai_response": reply }),
        start,
    )))
}

/// GET /api/v1/chats/{id}/history - Full turn history, oldest first.
pub async fn get_history(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let chat_id = parse_chat_id(&id)?;

    let messages: Vec<HistoryItem> = state
        .chat_service
        .get_history(&chat_id, &user.user_id)
        .await?
        .into_iter()
        .map(HistoryItem::from)
        .collect();

    Ok(Json(
        ApiResponse::timed(json!({ "chat_id": chat_id, "messages": messages }), start)
            .with_link("self", &format!("/api/v1/chats/{chat_id}/history")),
    ))
}

/// DELETE /api/v1/chats/{id} - Delete a chat session and its history.
pub async fn delete_chat(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let chat_id = parse_chat_id(&id)?;
    state
        .chat_service
        .delete_session(&chat_id, &user.user_id)
        .await?;

    Ok(Json(ApiResponse::timed(
        json!({ "deleted": true, "chat_id": chat_id }),
        start,
    )))
}
