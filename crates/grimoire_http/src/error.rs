//! API error type and its envelope response mapping.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use grimoire_core::db::DbError;
use grimoire_core::{Envelope, ServiceError};
use log::{error, warn};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Malformed JSON body: {0}")]
    MalformedBody(String),

    #[error("Malformed query string: {0}")]
    MalformedQuery(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(ServiceError::Validation(_) | ServiceError::DuplicateName { .. }) => {
                StatusCode::BAD_REQUEST
            }
            Self::Service(ServiceError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Service(ServiceError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MalformedBody(_) | Self::MalformedQuery(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::MalformedQuery(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!("event=http_response module=http status={} error={message}", status.as_u16());
        } else {
            warn!("event=http_response module=http status={} error={message}", status.as_u16());
        }

        (status, Json(Envelope::<()>::failure(message))).into_response()
    }
}

/// Failures that stop the server from starting or running.
#[derive(Error, Debug)]
pub enum ServeError {
    #[error("failed to open catalog store: {0}")]
    Store(#[from] DbError),

    #[error("server I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
