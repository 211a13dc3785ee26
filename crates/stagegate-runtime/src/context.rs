//! Evaluation context
//!
//! The runtime facts a rule is evaluated against: the active environment plus
//! arbitrary request attributes. Contexts are transient and never persisted.

use stagegate_core::{Environment, FilterType, Value};
use std::borrow::Cow;
use std::collections::HashMap;

/// Environment plus runtime attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationContext {
    pub environment: Environment,
    pub attributes: HashMap<String, Value>,
}

impl EvaluationContext {
    /// Create a context with no attributes
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            attributes: HashMap::new(),
        }
    }

    /// Builder method to add one attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder method to add attributes
    pub fn with_attributes(mut self, attributes: HashMap<String, Value>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Raw attribute by key
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Value a filter of the given type reads
    ///
    /// `server_mode` always reflects the context's environment. Other filter
    /// types read the attribute of the same key; null attributes count as absent.
    pub fn lookup(&self, filter_type: FilterType) -> Option<Cow<'_, Value>> {
        match filter_type {
            FilterType::ServerMode => Some(Cow::Owned(Value::from(self.environment.as_str()))),
            other => self
                .attributes
                .get(other.key())
                .filter(|v| !v.is_null())
                .map(Cow::Borrowed),
        }
    }
}
