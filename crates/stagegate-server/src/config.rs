//! Server configuration

use serde::{Deserialize, Serialize};
use stagegate_sdk::{
    EngineConfig, Environment, PersistencePolicy, RepositoryConfig, StatusCacheConfig,
};
use std::path::PathBuf;

/// Repository type for loading and persisting parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RepositoryType {
    /// File system store
    FileSystem {
        /// Store root (default: "data")
        #[serde(default = "default_repository_path")]
        path: PathBuf,
    },
    /// PostgreSQL store (requires the `postgres` feature)
    Database {
        /// Database connection URL
        url: String,
    },
    /// In-memory store, nothing survives a restart
    Memory,
}

fn default_repository_path() -> PathBuf {
    PathBuf::from("data")
}

impl Default for RepositoryType {
    fn default() -> Self {
        RepositoryType::FileSystem {
            path: default_repository_path(),
        }
    }
}

impl RepositoryType {
    /// SDK repository configuration
    pub fn to_repository_config(&self) -> RepositoryConfig {
        match self {
            RepositoryType::FileSystem { path } => {
                RepositoryConfig::file_system(path.to_string_lossy().to_string())
            }
            RepositoryType::Database { url } => RepositoryConfig::database(url.clone()),
            RepositoryType::Memory => RepositoryConfig::memory(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,

    /// Server port (HTTP)
    pub port: u16,

    /// Environment this process serves
    pub environment: Environment,

    /// Repository configuration for loading parameters
    pub repository: RepositoryType,

    /// Stage-list document checked against the registry at startup
    pub stage_list_file: Option<PathBuf>,

    /// Refuse to start when the stage lists disagree with the registry
    pub strict_consistency: bool,

    /// Status cache configuration
    pub status_cache: StatusCacheConfig,

    /// Timeout and retry policy for store writes
    pub persistence: PersistencePolicy,

    /// Log level
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: Environment::default(),
            repository: RepositoryType::default(),
            stage_list_file: None,
            strict_consistency: false,
            status_cache: StatusCacheConfig::default(),
            persistence: PersistencePolicy::default(),
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        // Try to read from config file
        let config_result = config::Config::builder()
            .add_source(config::File::with_name("config/server").required(false))
            .add_source(config::Environment::with_prefix("STAGEGATE"))
            .build();

        match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e)),
            Err(_) => {
                // Use default config if no config file found
                tracing::info!("No config file found, using default configuration");
                Ok(Self::default())
            }
        }
    }

    /// SDK engine configuration
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new()
            .with_environment(self.environment)
            .with_repository(self.repository.to_repository_config())
            .with_status_cache(self.status_cache.clone())
            .with_persistence(self.persistence)
    }

    /// Tracing filter used when `RUST_LOG` is not set
    pub fn log_filter(&self) -> String {
        let level = &self.log_level;
        format!(
            "stagegate_server={level},stagegate_sdk={level},stagegate_runtime={level},\
             stagegate_repository={level},tower_http=debug"
        )
    }

    /// Listen address
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
