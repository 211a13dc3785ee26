//! Rule model definitions
//!
//! A [`Rule`] is an ordered list of [`Filter`]s (AND) plus the value it yields
//! when matched. A [`Filter`] names one context attribute through its
//! [`FilterType`] and holds an ordered list of [`Condition`]s (OR).

use crate::ast::operator::Operator;
use crate::error::{CoreError, Result};
use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared type of a context attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// One of the deployment environment names (`dev`, `test`, `prod`)
    Environment,
    /// Free-form discrete string (platform, locale, id)
    Discrete,
    /// Semantic version string
    Version,
    /// Number
    Number,
}

impl AttributeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::Environment => "environment",
            AttributeKind::Discrete => "string",
            AttributeKind::Version => "version",
            AttributeKind::Number => "number",
        }
    }

    /// Returns true if ordering operators are meaningful for this kind
    pub fn is_ordered(&self) -> bool {
        matches!(self, AttributeKind::Version | AttributeKind::Number)
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognized filter types, each bound to one context attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Server mode the request claims to run under
    ServerMode,
    /// Client platform (ios, android, web, ...)
    ClientPlatform,
    /// Client application version
    AppVersion,
    /// Client application build number
    AppBuild,
    /// User locale (en_US, de_DE, ...)
    UserLocale,
    /// User identifier
    UserId,
}

impl FilterType {
    pub const ALL: [FilterType; 6] = [
        FilterType::ServerMode,
        FilterType::ClientPlatform,
        FilterType::AppVersion,
        FilterType::AppBuild,
        FilterType::UserLocale,
        FilterType::UserId,
    ];

    /// Context attribute key this filter reads
    pub fn key(&self) -> &'static str {
        match self {
            FilterType::ServerMode => "server_mode",
            FilterType::ClientPlatform => "client_platform",
            FilterType::AppVersion => "app_version",
            FilterType::AppBuild => "app_build",
            FilterType::UserLocale => "user_locale",
            FilterType::UserId => "user_id",
        }
    }

    /// Declared type of the attribute
    pub fn kind(&self) -> AttributeKind {
        match self {
            FilterType::ServerMode => AttributeKind::Environment,
            FilterType::ClientPlatform | FilterType::UserLocale | FilterType::UserId => {
                AttributeKind::Discrete
            }
            FilterType::AppVersion => AttributeKind::Version,
            FilterType::AppBuild => AttributeKind::Number,
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FilterType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        FilterType::ALL
            .into_iter()
            .find(|ft| ft.key() == normalized)
            .ok_or_else(|| CoreError::UnknownFilterType(s.to_string()))
    }
}

/// One operator/operand comparison against an attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub operator: Operator,
    pub operands: Vec<Value>,
}

impl Condition {
    pub fn new(operator: Operator, operands: Vec<Value>) -> Self {
        Self { operator, operands }
    }

    /// `attribute == operand`
    pub fn eq(operand: impl Into<Value>) -> Self {
        Self::new(Operator::Eq, vec![operand.into()])
    }

    /// `attribute != operand`
    pub fn ne(operand: impl Into<Value>) -> Self {
        Self::new(Operator::Ne, vec![operand.into()])
    }

    /// `attribute in operands`
    pub fn one_of<V: Into<Value>>(operands: impl IntoIterator<Item = V>) -> Self {
        Self::new(Operator::In, operands.into_iter().map(Into::into).collect())
    }

    /// Ordering comparison such as `attribute >= operand`
    pub fn compare(operator: Operator, operand: impl Into<Value>) -> Self {
        Self::new(operator, vec![operand.into()])
    }
}

/// An attribute-type tag plus conditions, matched with OR semantics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub filter_type: FilterType,
    pub conditions: Vec<Condition>,
}

impl Filter {
    pub fn new(filter_type: FilterType) -> Self {
        Self {
            filter_type,
            conditions: Vec::new(),
        }
    }

    /// Add a condition
    pub fn add_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Replace all conditions
    pub fn with_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = conditions;
        self
    }
}

/// Ordered filters (AND) plus the value yielded when they all match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub filters: Vec<Filter>,
    pub value_when_matched: Value,
}

impl Rule {
    pub fn new(value_when_matched: impl Into<Value>) -> Self {
        Self {
            filters: Vec::new(),
            value_when_matched: value_when_matched.into(),
        }
    }

    /// Add a filter
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_type_catalogue() {
        assert_eq!(FilterType::ServerMode.key(), "server_mode");
        assert_eq!(FilterType::ServerMode.kind(), AttributeKind::Environment);
        assert_eq!(FilterType::AppVersion.kind(), AttributeKind::Version);
        assert_eq!(FilterType::AppBuild.kind(), AttributeKind::Number);
        assert_eq!(FilterType::UserLocale.kind(), AttributeKind::Discrete);
    }

    #[test]
    fn test_filter_type_from_str() {
        assert_eq!(
            "Client_Platform".parse::<FilterType>().unwrap(),
            FilterType::ClientPlatform
        );
        assert!(matches!(
            "device_model".parse::<FilterType>(),
            Err(CoreError::UnknownFilterType(_))
        ));
        for ft in FilterType::ALL {
            assert_eq!(ft.key().parse::<FilterType>().unwrap(), ft);
        }
    }

    #[test]
    fn test_rule_builder() {
        let rule = Rule::new(true)
            .with_filter(
                Filter::new(FilterType::ServerMode)
                    .add_condition(Condition::eq("dev"))
                    .add_condition(Condition::eq("test")),
            )
            .with_filter(
                Filter::new(FilterType::AppVersion)
                    .add_condition(Condition::compare(Operator::Ge, "2.1.0")),
            );

        assert_eq!(rule.filters.len(), 2);
        assert_eq!(rule.filters[0].conditions.len(), 2);
        assert_eq!(rule.value_when_matched, Value::Bool(true));
    }

    #[test]
    fn test_one_of() {
        let cond = Condition::one_of(["ios", "android"]);
        assert_eq!(cond.operator, Operator::In);
        assert_eq!(cond.operands, vec![Value::from("ios"), Value::from("android")]);
    }

    #[test]
    fn test_ordered_kinds() {
        assert!(AttributeKind::Version.is_ordered());
        assert!(AttributeKind::Number.is_ordered());
        assert!(!AttributeKind::Discrete.is_ordered());
        assert!(!AttributeKind::Environment.is_ordered());
    }
}
