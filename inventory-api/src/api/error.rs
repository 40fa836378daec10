//! API error type and the `{ data, error }` response envelope

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inventory_common::ErrorKind;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Every response body: exactly one of `data` and `error` is non-null
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            data: Some(data),
            error: None,
        })
    }

    /// 201 Created with the new record
    pub fn created(data: T) -> (StatusCode, Json<Self>) {
        (StatusCode::CREATED, Self::ok(data))
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request could not be interpreted (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Authorization header missing or unreadable (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Credentials rejected (403)
    #[error("{0}")]
    Forbidden(String),

    /// Response could not be produced (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// inventory-common error, status chosen by its kind
    #[error(transparent)]
    Common(#[from] inventory_common::Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::Internal(msg) => {
                error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            ApiError::Common(err) => match err.kind() {
                ErrorKind::Validation => (StatusCode::BAD_REQUEST, err.to_string()),
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
                ErrorKind::Conflict => (StatusCode::CONFLICT, err.to_string()),
                ErrorKind::Store | ErrorKind::Config => {
                    error!("Store failure: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
        };

        let body = Envelope::<()> {
            data: None,
            error: Some(message),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
