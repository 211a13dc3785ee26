//! Configuration types for FeatureGate

use serde::{Deserialize, Serialize};
use stagegate_core::Environment;
use stagegate_repository::RepositoryConfig;
use stagegate_runtime::StatusCacheConfig;
use std::time::Duration;

use crate::error::{Result, SdkError};

/// Environment variable naming the process environment
pub const ENVIRONMENT_VAR: &str = "STAGEGATE_ENVIRONMENT";

/// Main engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Environment this process runs in; authoritative for every evaluation
    #[serde(default)]
    pub environment: Environment,

    /// Where parameters are loaded from and persisted to; `None` keeps
    /// everything in memory without a store
    #[serde(default)]
    pub repository: Option<RepositoryConfig>,

    /// Status cache configuration
    #[serde(default)]
    pub status_cache: StatusCacheConfig,

    /// Timeout and retry policy for store calls
    #[serde(default)]
    pub persistence: PersistencePolicy,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with the environment taken from `STAGEGATE_ENVIRONMENT`
    ///
    /// An unset variable leaves the default (`dev`); an unparsable value is an error.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new();
        if let Ok(value) = std::env::var(ENVIRONMENT_VAR) {
            config.environment = value.parse().map_err(|e| {
                SdkError::ConfigError(format!("{}={}: {}", ENVIRONMENT_VAR, value, e))
            })?;
        }
        Ok(config)
    }

    /// Set the process environment
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Set repository configuration
    pub fn with_repository(mut self, repository: RepositoryConfig) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Set status cache configuration
    pub fn with_status_cache(mut self, status_cache: StatusCacheConfig) -> Self {
        self.status_cache = status_cache;
        self
    }

    /// Set persistence policy
    pub fn with_persistence(mut self, persistence: PersistencePolicy) -> Self {
        self.persistence = persistence;
        self
    }
}

/// Timeout and retry policy applied to every store call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistencePolicy {
    /// Deadline for a single attempt
    #[serde(default = "default_timeout", with = "millis")]
    pub timeout: Duration,

    /// Extra attempts after the first failure
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Pause between attempts
    #[serde(default = "default_backoff", with = "millis")]
    pub backoff: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_retries() -> u32 {
    2
}

fn default_backoff() -> Duration {
    Duration::from_millis(100)
}

impl Default for PersistencePolicy {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            retries: default_retries(),
            backoff: default_backoff(),
        }
    }
}

impl PersistencePolicy {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Total number of attempts per call
    pub fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
