//! stagegate Core - Core types and definitions for the stagegate feature-gating engine
//!
//! This crate provides the fundamental types used across the stagegate workspace:
//! - Value types for parameter defaults and rule payloads
//! - Parameter names, stages, environments and data types
//! - Rule model (conditions, filters, rules) and the unvalidated admin rule specs
//! - Audit records
//! - Error types

pub mod ast;
pub mod audit;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use ast::{
    AttributeKind, Condition, ConditionSpec, Environment, Filter, FilterSpec, FilterType,
    Operator, Parameter, ParameterDefinition, Rule, RuleSpec, Stage, StageLists,
};
pub use audit::{AuditRecord, StageChange};
pub use error::CoreError;
pub use types::{DataType, ParamName, SemanticVersion, Value};
