//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how each
//! failure class maps onto an HTTP response.

use crate::config::ConfigError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use responsive_core::ports::{ErrorKind, PortError};
use serde::Serialize;
use tracing::{error, warn};

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error(transparent)]
    Port(#[from] PortError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The JSON body of every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Port(PortError::validation(message))
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Port(PortError::invalid_field(field, message))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Port(port) => match port.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
                ErrorKind::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
                ErrorKind::UpstreamFailure | ErrorKind::ParseFailure | ErrorKind::AccessDenied => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Config(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Port(port) => match port.kind() {
                ErrorKind::Validation => "validation",
                ErrorKind::NotFound => "not-found",
                ErrorKind::Unauthorized => "unauthorized",
                ErrorKind::UpstreamUnavailable => "upstream-unavailable",
                ErrorKind::UpstreamFailure => "upstream-failure",
                ErrorKind::ParseFailure => "parse-failure",
                ErrorKind::Timeout => "timeout",
                ErrorKind::AccessDenied => "access-denied",
            },
            ApiError::Config(_) | ApiError::Io(_) | ApiError::Internal(_) => "internal",
        }
    }

    pub fn body(&self) -> ErrorBody {
        let (message, details) = match self {
            ApiError::Port(PortError::Validation { message, field }) => (
                message.clone(),
                field
                    .as_ref()
                    .map(|f| serde_json::json!({ "field": f, "message": message })),
            ),
            other => (other.to_string(), None),
        };
        ErrorBody {
            success: false,
            kind: self.kind(),
            message,
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed ({}): {}", self.kind(), self);
        } else {
            warn!("Request rejected ({}): {}", self.kind(), self);
        }
        (status, Json(self.body())).into_response()
    }
}
