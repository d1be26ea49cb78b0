use axum::http::StatusCode;
use thiserror::Error;

use crate::error::ClientError;
use crate::uploads::StorageError;

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed caller input
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// 400 for bad input, the upstream status for upstream refusals, 500
    /// for everything else.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Client(ClientError::Upstream { status, .. }) => mirrored_status(*status),
            ApiError::Client(_) | ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Upstream status as our own; 502 if it is not a valid HTTP status.
pub fn mirrored_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}
