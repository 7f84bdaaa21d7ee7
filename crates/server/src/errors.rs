use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::ServiceError;
use thiserror::Error;
use tracing::{error, info};

/// Every error leaves the server as `{"status", "error", "message"}`.
#[derive(Debug, Clone, Serialize)]
pub struct JsonApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    pub message: String,
}

impl JsonApiError {
    /// `message` falls back to the error title when absent.
    pub fn new(status: StatusCode, error: &str, message: Option<String>) -> Self {
        Self { status, error: error.to_string(), message: message.unwrap_or_else(|| error.to_string()) }
    }

    /// Titled with the status's canonical reason phrase.
    pub fn from_status(status: StatusCode, message: Option<String>) -> Self {
        Self::new(status, status.canonical_reason().unwrap_or("Error"), message)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "status": self.status.as_u16(),
            "error": self.error,
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let client = |status: StatusCode, m: String| {
            info!(status = status.as_u16(), message = %m, "request rejected");
            JsonApiError::from_status(status, Some(m))
        };
        match e {
            ServiceError::Validation(m) => client(StatusCode::BAD_REQUEST, m),
            ServiceError::NotFound(m) => client(StatusCode::NOT_FOUND, m),
            ServiceError::Conflict(m) => client(StatusCode::CONFLICT, m),
            ServiceError::Connection(m) => {
                error!(error = %m, "store unavailable");
                JsonApiError::from_status(
                    StatusCode::SERVICE_UNAVAILABLE,
                    Some("The backing store is unavailable, try again later".into()),
                )
            }
            ServiceError::Internal(m) => {
                error!(error = %m, "internal error");
                JsonApiError::from_status(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Some("The server encountered an internal error".into()),
                )
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

impl StartupError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            StartupError::StoreUnavailable(_) => 4,
            _ => 1,
        }
    }
}
