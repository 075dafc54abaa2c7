use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use soil_core::DomainError;
use soil_infra::StoreError;

/// Everything a handler can fail with.
///
/// Client-caused failures carry the message shown to the caller. Store and
/// internal failures are answered with fixed messages; their detail only
/// goes to the log.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        ApiError::Internal(detail.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Store(e) => match e {
                StoreError::Conflict(_) | StoreError::Constraint(_) => StatusCode::CONFLICT,
                StoreError::NotFound => StatusCode::NOT_FOUND,
                StoreError::Unavailable(_) | StoreError::Timeout(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                StoreError::Serialization(_) | StoreError::Unknown(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::BadRequest(m)
            | ApiError::Unauthorized(m)
            | ApiError::NotFound(m)
            | ApiError::Conflict(m) => m.clone(),
            ApiError::Store(e) => match e {
                StoreError::Conflict(_) => {
                    "The record was modified by another request".to_string()
                }
                StoreError::Constraint(_) => {
                    "The request conflicts with existing data".to_string()
                }
                StoreError::NotFound => "Record not found".to_string(),
                StoreError::Unavailable(_) | StoreError::Timeout(_) => {
                    "Service temporarily unavailable".to_string()
                }
                StoreError::Serialization(_) | StoreError::Unknown(_) => {
                    INTERNAL_MESSAGE.to_string()
                }
            },
            ApiError::Internal(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

const INTERNAL_MESSAGE: &str = "An unexpected error occurred";

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(m) | DomainError::InvalidId(m) => ApiError::BadRequest(m),
            DomainError::NotFound(m) => ApiError::NotFound(m),
            DomainError::Conflict(m) => ApiError::Conflict(m),
            DomainError::Unauthorized => ApiError::Unauthorized("Unauthorized".to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(error = %detail, "request failed");
        }
        json_error(self.status(), self.public_message())
    }
}

/// `{"message": ...}` with the given status.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, axum::Json(json!({ "message": message.into() }))).into_response()
}

/// `{"message": ...}` with 200.
pub fn json_message(message: impl Into<String>) -> Response {
    json_error(StatusCode::OK, message)
}
