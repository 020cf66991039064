pub mod auth;
pub mod credentials;
pub mod error;
pub mod message_log;
pub mod messages;
pub mod middleware;
pub mod session;

use axum::{
    Router,
    routing::{get, post},
};

pub use auth::{AppState, AppStateInner};
pub use error::CoreError;

/// Build the full route table. Layers that concern the process as a whole
/// (tracing, CORS) are added by the server binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route(
            "/messages",
            get(messages::get_messages).post(messages::send_message),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
