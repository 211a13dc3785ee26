//! stagegate Runtime - Evaluation engine and parameter registry
//!
//! This crate provides the read path and the in-memory state of the
//! feature-gating engine:
//! - Condition matching, filter evaluation and rule resolution
//! - The stage gate
//! - Rule validation for admin-submitted rule specs
//! - The parameter registry and its consistency check
//! - The per-session status cache

pub mod cache;
pub mod consistency;
pub mod context;
pub mod engine;
pub mod error;
pub mod gate;
pub mod registry;
pub mod validation;

// Re-export main types
pub use cache::{CacheStats, FeatureStatus, StatusCache, StatusCacheConfig, StatusSummary};
pub use consistency::{ConsistencyReport, Discrepancy};
pub use context::EvaluationContext;
pub use engine::{evaluate, resolve, Evaluation};
pub use error::{Result, RuleLocation, RuntimeError};
pub use gate::StageGate;
pub use registry::ParameterRegistry;
pub use validation::validate_rules;
