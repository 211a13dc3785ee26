//! Error types for the repository layer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur during repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Nothing stored at the specified path
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization error
    #[error("Failed to process YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON (de)serialization error
    #[error("Failed to process JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Parser error from stagegate-parser
    #[error("Parser error: {0}")]
    Parser(String),

    /// Invalid path provided
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// Database error (when database feature is enabled)
    #[cfg(feature = "postgres")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Backend refused or could not complete the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Generic error
    #[error("Repository error: {0}")]
    Other(String),
}

impl From<stagegate_parser::ParseError> for RepositoryError {
    fn from(err: stagegate_parser::ParseError) -> Self {
        RepositoryError::Parser(err.to_string())
    }
}
