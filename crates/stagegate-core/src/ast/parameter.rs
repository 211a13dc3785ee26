//! Parameter definitions

use crate::ast::rule::Rule;
use crate::ast::spec::RuleSpec;
use crate::ast::stage::Stage;
use crate::types::{DataType, ParamName, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, stage-scoped, rule-governed configuration value
///
/// Parameter values are immutable once published. Updates build a new value
/// with [`Parameter::with_rules`] or [`Parameter::with_stage`], which bump the
/// revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: ParamName,
    pub description: String,
    pub stage: Stage,
    pub data_type: DataType,
    pub default_value: Value,
    pub rules: Vec<Rule>,
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
}

impl Parameter {
    /// Create a parameter with no rules at revision 0
    pub fn new(
        name: ParamName,
        description: impl Into<String>,
        stage: Stage,
        default_value: Value,
        data_type: DataType,
    ) -> Self {
        Self {
            name,
            description: description.into(),
            stage,
            data_type,
            default_value,
            rules: Vec::new(),
            revision: 0,
            updated_at: Utc::now(),
        }
    }

    /// Copy of this parameter carrying a new rule list
    pub fn with_rules(&self, rules: Vec<Rule>) -> Self {
        Self {
            rules,
            revision: self.revision + 1,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Copy of this parameter at another stage
    pub fn with_stage(&self, stage: Stage) -> Self {
        Self {
            stage,
            revision: self.revision + 1,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    pub fn is_deprecated(&self) -> bool {
        self.stage.is_deprecated()
    }
}

fn default_data_type() -> DataType {
    DataType::Bool
}

/// Stored and authored form of a parameter
///
/// Rules are kept as [`RuleSpec`]s; loading a definition validates them before
/// the parameter is published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: ParamName,

    #[serde(default)]
    pub description: String,

    pub stage: Stage,

    #[serde(default = "default_data_type")]
    pub data_type: DataType,

    #[serde(rename = "default", alias = "default_value")]
    pub default_value: Value,

    #[serde(default)]
    pub rules: Vec<RuleSpec>,

    #[serde(default)]
    pub revision: u64,
}

impl From<&Parameter> for ParameterDefinition {
    fn from(parameter: &Parameter) -> Self {
        Self {
            name: parameter.name.clone(),
            description: parameter.description.clone(),
            stage: parameter.stage,
            data_type: parameter.data_type,
            default_value: parameter.default_value.clone(),
            rules: parameter.rules.iter().map(RuleSpec::from).collect(),
            revision: parameter.revision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Condition, Filter, FilterType};

    fn sample() -> Parameter {
        Parameter::new(
            ParamName::new("new_checkout").unwrap(),
            "New checkout flow",
            Stage::Test,
            Value::Bool(false),
            DataType::Bool,
        )
    }

    #[test]
    fn test_with_rules_bumps_revision() {
        let param = sample();
        let rule = Rule::new(true)
            .with_filter(Filter::new(FilterType::ServerMode).add_condition(Condition::eq("test")));

        let updated = param.with_rules(vec![rule.clone()]);
        assert_eq!(updated.revision, 1);
        assert_eq!(updated.rules, vec![rule]);
        assert!(param.rules.is_empty());
        assert_eq!(param.revision, 0);
    }

    #[test]
    fn test_with_stage() {
        let promoted = sample().with_stage(Stage::Prod);
        assert_eq!(promoted.stage, Stage::Prod);
        assert_eq!(promoted.revision, 1);
        assert!(!promoted.is_deprecated());
        assert!(promoted.with_stage(Stage::Deprecated).is_deprecated());
    }

    #[test]
    fn test_definition_from_parameter() {
        let param = sample().with_rules(vec![Rule::new(true)
            .with_filter(Filter::new(FilterType::ServerMode).add_condition(Condition::eq("test")))]);

        let def = ParameterDefinition::from(&param);
        assert_eq!(def.name.as_str(), "new_checkout");
        assert_eq!(def.stage, Stage::Test);
        assert_eq!(def.revision, 1);
        assert_eq!(def.rules.len(), 1);
        assert_eq!(def.rules[0].filters[0].filter_type, "server_mode");
    }

    #[test]
    fn test_definition_yaml_defaults() {
        let yaml = "name: dark_mode\nstage: dev\ndefault: false\n";
        let def: ParameterDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.data_type, DataType::Bool);
        assert!(def.rules.is_empty());
        assert_eq!(def.description, "");
        assert_eq!(def.default_value, Value::Bool(false));
    }
}
