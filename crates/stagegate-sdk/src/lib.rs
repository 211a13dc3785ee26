//! stagegate SDK
//!
//! High-level API for feature gating: build a [`FeatureGate`], evaluate
//! parameters against request attributes, and administer rules and stages.
//!
//! ```rust,ignore
//! use stagegate_sdk::{Environment, FeatureGate, RepositoryConfig};
//!
//! let gate = FeatureGate::builder()
//!     .with_environment(Environment::Test)
//!     .with_repository(RepositoryConfig::file_system("data"))
//!     .build()
//!     .await?;
//!
//! if gate.is_enabled("new_checkout", attributes)? {
//!     // new flow
//! }
//! ```

pub mod audit;
pub mod builder;
pub mod config;
pub mod error;
pub mod gate;
pub mod persistence;
pub mod update;

// Re-export main types
pub use audit::AuditLog;
pub use builder::{open_store, FeatureGateBuilder};
pub use config::{EngineConfig, PersistencePolicy, ENVIRONMENT_VAR};
pub use error::{Result, SdkError};
pub use gate::FeatureGate;
pub use update::UpdateService;

// Re-export commonly used types from dependencies
pub use stagegate_core::{
    AuditRecord, DataType, Environment, FilterSpec, ParamName, Parameter, ParameterDefinition,
    RuleSpec, Stage, StageLists, Value,
};
pub use stagegate_parser::StageListParser;
pub use stagegate_repository::{ParameterStore, RepositoryConfig, RepositorySource};
pub use stagegate_runtime::{
    CacheStats, ConsistencyReport, Discrepancy, Evaluation, FeatureStatus, RuleLocation,
    RuntimeError, StatusCacheConfig, StatusSummary,
};
