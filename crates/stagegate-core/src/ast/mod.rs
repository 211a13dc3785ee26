//! Parameter and rule model
//!
//! This module contains the definitions for:
//! - Stages, environments and stage lists
//! - Operators
//! - Conditions, filters and rules (validated form)
//! - Rule specs (unvalidated admin input and stored form)
//! - Parameters and parameter definitions

pub mod operator;
pub mod parameter;
pub mod rule;
pub mod spec;
pub mod stage;

pub use operator::Operator;
pub use parameter::{Parameter, ParameterDefinition};
pub use rule::{AttributeKind, Condition, Filter, FilterType, Rule};
pub use spec::{ConditionSpec, FilterSpec, RuleSpec};
pub use stage::{Environment, Stage, StageLists};
