//! SDK error types

use stagegate_core::{ParamName, Stage};
use stagegate_parser::ParseError;
use stagegate_repository::{ConfigError as RepositoryConfigError, RepositoryError};
use stagegate_runtime::RuntimeError;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Parser error
    #[error("Parser error: {0}")]
    ParseError(#[from] ParseError),

    /// Runtime error (registry and rule validation)
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Loading from the store failed
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// A durable write failed after every retry; nothing was applied
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    /// Stage promotion that is not exactly one step forward
    #[error("Invalid stage transition for '{name}': {from} -> {to}")]
    StageTransition {
        name: ParamName,
        from: Stage,
        to: Stage,
    },

    /// Malformed admin request (empty committer and the like)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<RepositoryConfigError> for SdkError {
    fn from(err: RepositoryConfigError) -> Self {
        SdkError::ConfigError(err.to_string())
    }
}

impl SdkError {
    /// The runtime error behind this error, if any
    pub fn as_runtime(&self) -> Option<&RuntimeError> {
        match self {
            SdkError::Runtime(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true for rule validation failures
    pub fn is_validation(&self) -> bool {
        self.as_runtime().map_or(false, RuntimeError::is_validation)
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
