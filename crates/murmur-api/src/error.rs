use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;

use murmur_db::DbError;
use murmur_types::api::ErrorResponse;

/// Failure kinds of the core operations.
///
/// `Conflict` and `Auth` carry fixed messages: callers never learn which
/// field collided or whether an identifier exists.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("user already exists")]
    Conflict,

    #[error("invalid credentials")]
    Auth,

    #[error("store unavailable")]
    StoreUnavailable(#[source] DbError),

    #[error("internal error")]
    Internal,
}

impl CoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Auth => StatusCode::UNAUTHORIZED,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation => Self::Conflict,
            other => Self::StoreUnavailable(other),
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        if let Self::StoreUnavailable(source) = &self {
            error!("Store unavailable: {}", source);
        }

        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub(crate) fn join_error(e: JoinError) -> CoreError {
    error!("spawn_blocking join error: {}", e);
    CoreError::Internal
}
