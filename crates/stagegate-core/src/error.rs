//! Error types for stagegate Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid parameter name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("Unknown data type: {0}")]
    UnknownDataType(String),

    #[error("Unknown filter type: {0}")]
    UnknownFilterType(String),

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Type error: {0}")]
    TypeError(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
