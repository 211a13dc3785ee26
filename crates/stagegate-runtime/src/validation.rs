//! Rule validation
//!
//! Turns submitted [`RuleSpec`]s into typed [`Rule`]s, rejecting the whole list
//! on the first problem. Checks, in order, for every rule:
//!
//! - the rule has at least one filter
//! - the matched value has the parameter's data type
//! - every filter names a known filter type and has at least one condition
//! - every condition uses a known operator with operands that fit the
//!   filter's attribute kind
//!
//! Errors carry the [`RuleLocation`] of the offending element.

use crate::engine::matcher;
use crate::error::{Result, RuleLocation, RuntimeError};
use stagegate_core::{
    Condition, ConditionSpec, DataType, Filter, FilterSpec, FilterType, Operator, Rule, RuleSpec,
};

/// Validate a full rule list against a parameter's data type
pub fn validate_rules(specs: &[RuleSpec], data_type: DataType) -> Result<Vec<Rule>> {
    specs
        .iter()
        .enumerate()
        .map(|(index, spec)| validate_rule(spec, index, data_type))
        .collect()
}

/// Validate one rule spec at position `index`
pub fn validate_rule(spec: &RuleSpec, index: usize, data_type: DataType) -> Result<Rule> {
    let location = RuleLocation::rule(index);

    if spec.filters.is_empty() {
        return Err(RuntimeError::MalformedRule {
            location,
            reason: "rule has no filters".to_string(),
        });
    }

    if !data_type.accepts(&spec.value) {
        return Err(RuntimeError::MalformedRule {
            location,
            reason: format!(
                "value {} is a {}, parameter expects {}",
                spec.value,
                spec.value.type_name(),
                data_type
            ),
        });
    }

    let filters = spec
        .filters
        .iter()
        .enumerate()
        .map(|(f, filter)| validate_filter(filter, index, f))
        .collect::<Result<Vec<_>>>()?;

    Ok(Rule {
        filters,
        value_when_matched: spec.value.clone(),
    })
}

fn validate_filter(spec: &FilterSpec, rule: usize, index: usize) -> Result<Filter> {
    let location = RuleLocation::filter(rule, index);

    let filter_type = spec
        .filter_type
        .parse::<FilterType>()
        .map_err(|e| RuntimeError::MalformedFilter {
            location,
            reason: e.to_string(),
        })?;

    if spec.conditions.is_empty() {
        return Err(RuntimeError::MalformedFilter {
            location,
            reason: format!("filter '{}' has no conditions", filter_type),
        });
    }

    let conditions = spec
        .conditions
        .iter()
        .enumerate()
        .map(|(c, condition)| {
            validate_condition(condition, filter_type, RuleLocation::condition(rule, index, c))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Filter {
        filter_type,
        conditions,
    })
}

fn validate_condition(
    spec: &ConditionSpec,
    filter_type: FilterType,
    location: RuleLocation,
) -> Result<Condition> {
    let located = |reason: String| RuntimeError::MalformedCondition {
        location: Some(location),
        reason,
    };

    let operator = spec
        .operator
        .parse::<Operator>()
        .map_err(|e| located(e.to_string()))?;
    let condition = Condition::new(operator, spec.operands.clone());

    matcher::check_condition(&condition, filter_type.kind()).map_err(|e| match e {
        RuntimeError::MalformedCondition { reason, .. } => located(reason),
        other => other,
    })?;

    Ok(condition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagegate_core::{FilterSpec, Value};

    fn server_mode(op: &str, operands: Vec<Value>) -> FilterSpec {
        FilterSpec::new("server_mode").condition(op, operands)
    }

    #[test]
    fn test_valid_rules() {
        let specs = vec![
            RuleSpec::new(true)
                .filter(server_mode("=", vec!["dev".into()]).condition("==", vec!["test".into()]))
                .filter(FilterSpec::new("app_version").condition(">=", vec!["2.1.0".into()])),
            RuleSpec::new(false).filter(
                FilterSpec::new("client_platform").condition("in", vec!["ios".into(), "web".into()]),
            ),
        ];

        let rules = validate_rules(&specs, DataType::Bool).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].filters[0].filter_type, FilterType::ServerMode);
        assert_eq!(rules[0].filters[0].conditions[1].operator, Operator::Eq);
        assert_eq!(rules[0].filters[1].conditions[0].operator, Operator::Ge);
        assert_eq!(rules[1].filters[0].conditions[0].operands.len(), 2);
    }

    #[test]
    fn test_empty_rule_list_is_valid() {
        assert!(validate_rules(&[], DataType::Number).unwrap().is_empty());
    }

    #[test]
    fn test_rule_without_filters() {
        let err = validate_rules(&[RuleSpec::new(true)], DataType::Bool).unwrap_err();
        assert!(matches!(err, RuntimeError::MalformedRule { location, .. } if location.rule == 0));
    }

    #[test]
    fn test_value_type_mismatch() {
        let specs = vec![
            RuleSpec::new(true).filter(server_mode("eq", vec!["dev".into()])),
            RuleSpec::new("yes").filter(server_mode("eq", vec!["dev".into()])),
        ];
        let err = validate_rules(&specs, DataType::Bool).unwrap_err();
        match err {
            RuntimeError::MalformedRule { location, reason } => {
                assert_eq!(location, RuleLocation::rule(1));
                assert!(reason.contains("expects bool"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_filter_type() {
        let specs = vec![RuleSpec::new(true).filter(FilterSpec::new("device_model").condition("eq", vec!["x".into()]))];
        let err = validate_rules(&specs, DataType::Bool).unwrap_err();
        assert_eq!(err.location(), Some(RuleLocation::filter(0, 0)));
        assert!(matches!(err, RuntimeError::MalformedFilter { .. }));
    }

    #[test]
    fn test_filter_without_conditions() {
        let specs = vec![RuleSpec::new(true).filter(FilterSpec::new("user_id"))];
        let err = validate_rules(&specs, DataType::Bool).unwrap_err();
        assert!(matches!(err, RuntimeError::MalformedFilter { reason, .. } if reason.contains("no conditions")));
    }

    #[test]
    fn test_condition_errors_are_located() {
        let cases = vec![
            // unknown operator
            server_mode("like", vec!["dev".into()]),
            // unknown environment
            server_mode("eq", vec!["staging".into()]),
            // ordering on an environment
            server_mode("gt", vec!["dev".into()]),
            // wrong operand count
            server_mode("eq", vec!["dev".into(), "test".into()]),
        ];

        for filter in cases {
            let specs = vec![RuleSpec::new(true)
                .filter(FilterSpec::new("user_id").condition("eq", vec!["u1".into()]))
                .filter(filter)];
            let err = validate_rules(&specs, DataType::Bool).unwrap_err();
            assert!(matches!(err, RuntimeError::MalformedCondition { .. }), "{:?}", err);
            assert_eq!(err.location(), Some(RuleLocation::condition(0, 1, 0)));
        }
    }

    #[test]
    fn test_version_operands_must_be_strings() {
        let specs = vec![RuleSpec::new(true)
            .filter(FilterSpec::new("app_version").condition("ge", vec![Value::Number(2.0)]))];
        let err = validate_rules(&specs, DataType::Bool).unwrap_err();
        assert!(err.to_string().contains("not a valid version operand"));
    }
}
