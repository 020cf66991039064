use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Duration;
use tracing::info;

use murmur_db::Database;
use murmur_types::api::{
    Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserResponse,
};

use crate::credentials::CredentialStore;
use crate::error::{CoreError, join_error};
use crate::message_log::MessageLog;
use crate::session::SessionManager;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub credentials: CredentialStore,
    pub messages: MessageLog,
    pub sessions: SessionManager,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, jwt_secret: impl Into<String>, session_ttl: Duration) -> Self {
        Self {
            credentials: CredentialStore::new(db.clone()),
            messages: MessageLog::new(db),
            sessions: SessionManager::new(jwt_secret, session_ttl),
        }
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, CoreError> {
    // Argon2 and SQLite both block; keep them off the async runtime
    let st = state.clone();
    let user = tokio::task::spawn_blocking(move || {
        st.credentials
            .register(&req.username, &req.email, &req.password)
    })
    .await
    .map_err(join_error)??;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id,
            username: user.username,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let st = state.clone();
    let user = tokio::task::spawn_blocking(move || {
        st.credentials.authenticate(&req.identifier, &req.password)
    })
    .await
    .map_err(join_error)??;

    let token = state.sessions.issue(&user)?;
    info!(user_id = user.id, "User {} logged in", user.username);

    Ok(Json(LoginResponse {
        user_id: user.id,
        username: user.username,
        token,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, CoreError> {
    state.sessions.revoke(&claims)?;
    info!(user_id = claims.sub, "User {} logged out", claims.username);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, CoreError> {
    let st = state.clone();
    let user = tokio::task::spawn_blocking(move || st.credentials.user(claims.sub))
        .await
        .map_err(join_error)??
        // Token outlived its account
        .ok_or(CoreError::Auth)?;

    Ok(Json(UserResponse::from(user)))
}
