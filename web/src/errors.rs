/// Error handling for the HTTP surface.
///
/// Every fallible operation funnels into an [`ErrorResponse`] body with a
/// machine-readable code; [`IntoErrorResponse`] decides the status code and
/// how loudly the failure is logged. Client errors are normal operation and
/// never logged at error level.
use holdem_engine::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

/// Standard error response format for all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "room_not_found")
    pub error: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn into_response(self, status: StatusCode) -> Response {
        reply::with_status(reply::json(&self), status).into_response()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Error classification for logging levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Client errors (4xx) - expected, normal operation
    Client,
    /// Server errors (5xx) - unexpected, needs investigation
    Server,
    /// Critical errors - room integrity at risk
    Critical,
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait IntoErrorResponse {
    fn status_code(&self) -> StatusCode;

    fn error_code(&self) -> &'static str;

    fn error_message(&self) -> String;

    fn error_details(&self) -> Option<serde_json::Value> {
        None
    }

    fn severity(&self) -> ErrorSeverity {
        if self.status_code().is_server_error() {
            ErrorSeverity::Server
        } else {
            ErrorSeverity::Client
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        if let Some(details) = self.error_details() {
            ErrorResponse::with_details(self.error_code(), self.error_message(), details)
        } else {
            ErrorResponse::new(self.error_code(), self.error_message())
        }
    }

    fn into_http_response(self) -> Response
    where
        Self: Sized,
    {
        let status = self.status_code();
        let response = self.to_error_response();
        match self.severity() {
            ErrorSeverity::Client => {
                tracing::info!(code = response.error, message = %response.message, "client error")
            }
            ErrorSeverity::Server => {
                tracing::error!(code = response.error, message = %response.message, "server error")
            }
            ErrorSeverity::Critical => {
                tracing::error!(code = response.error, message = %response.message, "critical error")
            }
        }
        response.into_response(status)
    }
}

/// Failures of room operations as seen by callers of the coordinator.
#[derive(Debug, Error)]
pub enum RoomError {
    #[error("room {0} was not found")]
    NotFound(String),
    #[error(transparent)]
    Rules(#[from] EngineError),
    #[error("only the room creator may do that")]
    NotCreator,
    #[error("room is temporarily unavailable, retry shortly")]
    Degraded,
    #[error("room is quarantined after an internal fault")]
    Quarantined,
    #[error("room worker is gone")]
    Closed,
}

impl IntoErrorResponse for RoomError {
    fn status_code(&self) -> StatusCode {
        match self {
            RoomError::NotFound(_) => StatusCode::NOT_FOUND,
            RoomError::Rules(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            RoomError::Rules(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RoomError::NotCreator => StatusCode::FORBIDDEN,
            RoomError::Degraded | RoomError::Quarantined => StatusCode::SERVICE_UNAVAILABLE,
            RoomError::Closed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RoomError::NotFound(_) => "room_not_found",
            RoomError::Rules(err) if err.is_client_error() => "illegal_action",
            RoomError::Rules(_) => "room_fault",
            RoomError::NotCreator => "not_the_creator",
            RoomError::Degraded => "room_degraded",
            RoomError::Quarantined => "room_quarantined",
            RoomError::Closed => "room_closed",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            RoomError::NotFound(id) => Some(serde_json::json!({ "room_id": id })),
            _ => None,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            RoomError::Rules(err) if !err.is_client_error() => ErrorSeverity::Critical,
            RoomError::Quarantined => ErrorSeverity::Critical,
            RoomError::Degraded | RoomError::Closed => ErrorSeverity::Server,
            _ => ErrorSeverity::Client,
        }
    }
}
