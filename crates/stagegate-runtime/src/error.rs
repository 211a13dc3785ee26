//! Runtime error types

use crate::consistency::ConsistencyReport;
use serde::Serialize;
use stagegate_core::{CoreError, ParamName};
use std::fmt;
use thiserror::Error;

/// Position of an offending element inside a submitted rule list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleLocation {
    pub rule: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<usize>,
}

impl RuleLocation {
    pub fn rule(rule: usize) -> Self {
        Self {
            rule,
            filter: None,
            condition: None,
        }
    }

    pub fn filter(rule: usize, filter: usize) -> Self {
        Self {
            filter: Some(filter),
            ..Self::rule(rule)
        }
    }

    pub fn condition(rule: usize, filter: usize, condition: usize) -> Self {
        Self {
            condition: Some(condition),
            ..Self::filter(rule, filter)
        }
    }
}

impl fmt::Display for RuleLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rules[{}]", self.rule)?;
        if let Some(filter) = self.filter {
            write!(f, ".filters[{}]", filter)?;
        }
        if let Some(condition) = self.condition {
            write!(f, ".conditions[{}]", condition)?;
        }
        Ok(())
    }
}

fn at(location: &Option<RuleLocation>) -> String {
    location.map(|l| format!(" at {}", l)).unwrap_or_default()
}

/// Runtime error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// A parameter with this name is already registered
    #[error("Parameter already registered: {0}")]
    DuplicateParameter(ParamName),

    /// No parameter with this name is registered
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// Condition with an unknown operator or operands incompatible with the attribute type
    #[error("Malformed condition{}: {reason}", at(.location))]
    MalformedCondition {
        location: Option<RuleLocation>,
        reason: String,
    },

    /// Filter with an unknown type or no conditions
    #[error("Malformed filter at {location}: {reason}")]
    MalformedFilter {
        location: RuleLocation,
        reason: String,
    },

    /// Rule with no filters or a value of the wrong type
    #[error("Malformed rule at {location}: {reason}")]
    MalformedRule {
        location: RuleLocation,
        reason: String,
    },

    /// Registered names disagree with the declared stage lists
    #[error("Consistency check failed: {0}")]
    Consistency(ConsistencyReport),

    /// Core model error
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl RuntimeError {
    pub(crate) fn malformed_condition(reason: impl Into<String>) -> Self {
        RuntimeError::MalformedCondition {
            location: None,
            reason: reason.into(),
        }
    }

    /// Location of the offending rule element, for validation errors
    pub fn location(&self) -> Option<RuleLocation> {
        match self {
            RuntimeError::MalformedCondition { location, .. } => *location,
            RuntimeError::MalformedFilter { location, .. }
            | RuntimeError::MalformedRule { location, .. } => Some(*location),
            _ => None,
        }
    }

    /// Returns true for rule validation failures
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RuntimeError::MalformedCondition { .. }
                | RuntimeError::MalformedFilter { .. }
                | RuntimeError::MalformedRule { .. }
        )
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
