use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

/// Endpoint-level failures. The display text is what the client sees; the
/// wrapped storage error only goes to the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to read messages")]
    ListFailed(#[source] ServiceError),
    #[error("Failed to save the message")]
    CreateFailed(#[source] ServiceError),
    #[error("Failed to delete the message")]
    DeleteFailed(#[source] ServiceError),
    #[error("Message not found")]
    NotFound,
    #[error("Invalid JSON body")]
    InvalidBody(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ListFailed(_) | Self::CreateFailed(_) | Self::DeleteFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn delete(err: ServiceError) -> Self {
        if err.is_not_found() { Self::NotFound } else { Self::DeleteFailed(err) }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::ListFailed(e) | Self::CreateFailed(e) | Self::DeleteFailed(e) => {
                error!(error = %e, "{}", self);
            }
            Self::InvalidBody(reason) => warn!(%reason, "rejected request body"),
            Self::NotFound => {}
        }
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("message store unavailable: {0}")]
    Storage(#[from] ServiceError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
