use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::auth::AppState;
use crate::error::CoreError;

/// Extract and validate the session token from the Authorization header,
/// then hand the caller's `Claims` to the handler as an extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, CoreError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(CoreError::Auth)?;

    let claims = state.sessions.validate(token)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
