use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;
use tutorbook_core::{
    chat::ChatSession,
    models::chat::{ChatMessage, SendMessageRequest},
};

use crate::{
    ApiState,
    middleware::{error_handling::AppError, session::AuthSession},
};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Only messages strictly newer than this instant
    pub since: Option<DateTime<Utc>>,
}

/// Chat session connected as the request user. Pair with [`release`].
async fn connect(state: &ApiState, user_id: &str) -> Result<ChatSession, AppError> {
    let provider = state
        .chat
        .clone()
        .ok_or_else(|| AppError::Unavailable("Chat is not configured".to_string()))?;

    let mut session = ChatSession::new(provider);
    session.connect(user_id).await?;
    Ok(session)
}

async fn release(mut session: ChatSession) {
    if let Err(e) = session.disconnect().await {
        warn!("Chat disconnect failed: {}", e);
    }
}

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<Arc<ApiState>>,
    AuthSession(user): AuthSession,
    Path(peer_id): Path<String>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), AppError> {
    let session = connect(&state, &user.id).await?;
    let sent = session.send(&peer_id, &payload.text).await;
    release(session).await;
    let message = sent?;

    Ok((StatusCode::CREATED, Json(message)))
}

#[axum::debug_handler]
pub async fn list_messages(
    State(state): State<Arc<ApiState>>,
    AuthSession(user): AuthSession,
    Path(peer_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let session = connect(&state, &user.id).await?;
    let history = session.history(&peer_id, query.since).await;
    release(session).await;
    let messages = history?;

    Ok(Json(messages))
}
