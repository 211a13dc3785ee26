//! Rule specifications
//!
//! Specs are the unvalidated shape of rules as administrators submit them and as
//! stores persist them. Filter types and operators are plain strings here; they
//! become a typed [`Rule`](crate::ast::Rule) only after validation against the
//! parameter's data type and the attribute catalogue.

use crate::ast::rule::{Condition, Filter, Rule};
use crate::types::Value;
use serde::{Deserialize, Serialize};

/// One `{operator, operands}` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    #[serde(rename = "op", alias = "operator")]
    pub operator: String,
    #[serde(default)]
    pub operands: Vec<Value>,
}

/// A filter type name plus its condition specs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(rename = "type", alias = "filter_type", alias = "filterType")]
    pub filter_type: String,
    #[serde(default)]
    pub conditions: Vec<ConditionSpec>,
}

/// Filter specs plus the value when matched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    #[serde(rename = "value", alias = "value_when_matched")]
    pub value: Value,
}

impl ConditionSpec {
    pub fn new(operator: impl Into<String>, operands: Vec<Value>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }
}

impl FilterSpec {
    pub fn new(filter_type: impl Into<String>) -> Self {
        Self {
            filter_type: filter_type.into(),
            conditions: Vec::new(),
        }
    }

    /// Add a condition spec
    pub fn condition(mut self, operator: impl Into<String>, operands: Vec<Value>) -> Self {
        self.conditions.push(ConditionSpec::new(operator, operands));
        self
    }
}

impl RuleSpec {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            filters: Vec::new(),
            value: value.into(),
        }
    }

    /// Add a filter spec
    pub fn filter(mut self, filter: FilterSpec) -> Self {
        self.filters.push(filter);
        self
    }
}

impl From<&Condition> for ConditionSpec {
    fn from(condition: &Condition) -> Self {
        Self {
            operator: condition.operator.as_str().to_string(),
            operands: condition.operands.clone(),
        }
    }
}

impl From<&Filter> for FilterSpec {
    fn from(filter: &Filter) -> Self {
        Self {
            filter_type: filter.filter_type.key().to_string(),
            conditions: filter.conditions.iter().map(ConditionSpec::from).collect(),
        }
    }
}

impl From<&Rule> for RuleSpec {
    fn from(rule: &Rule) -> Self {
        Self {
            filters: rule.filters.iter().map(FilterSpec::from).collect(),
            value: rule.value_when_matched.clone(),
        }
    }
}
