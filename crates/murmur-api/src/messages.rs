use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use murmur_types::api::{Claims, MessageResponse, SendMessageRequest};

use crate::auth::AppState;
use crate::error::{CoreError, join_error};
use crate::message_log::RECENT_LIMIT;

/// All authenticated users share one board; there are no per-user scopes.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let st = state.clone();
    let message = tokio::task::spawn_blocking(move || st.messages.append(&claims, &req.message))
        .await
        .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}

pub async fn get_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, CoreError> {
    let st = state.clone();
    let messages = tokio::task::spawn_blocking(move || st.messages.recent(&claims, RECENT_LIMIT))
        .await
        .map_err(join_error)??;

    let body: Vec<MessageResponse> = messages.into_iter().map(MessageResponse::from).collect();
    Ok(Json(body))
}
