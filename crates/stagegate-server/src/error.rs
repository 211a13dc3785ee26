//! Server error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use stagegate_sdk::{RuleLocation, RuntimeError, SdkError};
use std::fmt;

/// Server error type
#[derive(Debug)]
pub enum ServerError {
    /// Unknown parameter or resource
    NotFound(String),

    /// Duplicate registration or an invalid stage transition
    Conflict(String),

    /// Rule validation failure
    Unprocessable {
        message: String,
        location: Option<RuleLocation>,
    },

    /// Invalid request
    InvalidRequest(String),

    /// The store could not be written; nothing was applied
    ServiceUnavailable(String),

    /// Internal server error
    InternalError(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
            ServerError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ServerError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ServerError::Unprocessable { message, .. } => {
                write!(f, "Validation failed: {}", message)
            }
            ServerError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ServerError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ServerError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        if let ServerError::Unprocessable {
            location: Some(location),
            ..
        } = &self
        {
            body["location"] = json!(location);
        }

        (status, Json(body)).into_response()
    }
}

impl From<SdkError> for ServerError {
    fn from(err: SdkError) -> Self {
        match err {
            SdkError::Runtime(RuntimeError::UnknownParameter(_)) => {
                ServerError::NotFound(err.to_string())
            }
            SdkError::Runtime(RuntimeError::DuplicateParameter(_))
            | SdkError::StageTransition { .. } => ServerError::Conflict(err.to_string()),
            SdkError::Runtime(ref runtime) if runtime.is_validation() => {
                ServerError::Unprocessable {
                    location: runtime.location(),
                    message: err.to_string(),
                }
            }
            SdkError::Runtime(RuntimeError::Core(_)) | SdkError::InvalidRequest(_) => {
                ServerError::InvalidRequest(err.to_string())
            }
            SdkError::PersistenceUnavailable(_) => ServerError::ServiceUnavailable(err.to_string()),
            other => ServerError::InternalError(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::InternalError(err.to_string())
    }
}
