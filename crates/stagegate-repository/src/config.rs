//! Repository configuration types
//!
//! Selects the persistence backend (file system, database, memory) and where
//! it lives.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Repository source type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositorySource {
    /// YAML files on disk
    #[serde(alias = "file_system")]
    FileSystem,
    /// PostgreSQL database
    Database,
    /// In-process memory, nothing survives a restart
    Memory,
}

impl Default for RepositorySource {
    fn default() -> Self {
        Self::FileSystem
    }
}

/// Repository configuration
///
/// # Examples
///
/// ```rust
/// use stagegate_repository::RepositoryConfig;
///
/// // File system store
/// let config = RepositoryConfig::file_system("data");
///
/// // Database store
/// let config = RepositoryConfig::database("postgresql://localhost/stagegate");
///
/// // Memory store (for testing)
/// let config = RepositoryConfig::memory();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Configuration source type
    #[serde(default)]
    pub source: RepositorySource,

    /// File system base path (required for FileSystem source)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    /// Database connection URL (required for Database source)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
}

impl RepositoryConfig {
    /// Create a file system store configuration
    pub fn file_system(path: impl Into<String>) -> Self {
        Self {
            source: RepositorySource::FileSystem,
            base_path: Some(path.into()),
            database_url: None,
        }
    }

    /// Create a database store configuration
    pub fn database(url: impl Into<String>) -> Self {
        Self {
            source: RepositorySource::Database,
            base_path: None,
            database_url: Some(url.into()),
        }
    }

    /// Create a memory store configuration
    pub fn memory() -> Self {
        Self {
            source: RepositorySource::Memory,
            base_path: None,
            database_url: None,
        }
    }

    /// Validate the configuration
    ///
    /// Returns an error if required fields are missing for the selected source.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.source {
            RepositorySource::FileSystem if self.base_path.is_none() => {
                Err(ConfigError::MissingField {
                    backend: "FileSystem".to_string(),
                    field: "base_path".to_string(),
                })
            }
            RepositorySource::Database if self.database_url.is_none() => {
                Err(ConfigError::MissingField {
                    backend: "Database".to_string(),
                    field: "database_url".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required field is missing for the selected source
    #[error("{backend} source requires {field} to be set")]
    MissingField { backend: String, field: String },
}
