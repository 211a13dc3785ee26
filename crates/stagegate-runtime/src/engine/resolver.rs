//! Rule resolution
//!
//! The first rule whose filters all match supplies the value; otherwise the
//! parameter's default applies. The stage gate then decides whether the
//! resolved value may be used in the context's environment.

use crate::context::EvaluationContext;
use crate::engine::filter::filter_matches;
use crate::gate::StageGate;
use serde::Serialize;
use stagegate_core::{Parameter, Rule, Value};
use tracing::debug;

/// Outcome of evaluating one parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Effective value
    pub value: Value,
    /// Index of the rule that matched, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<usize>,
    /// True when the stage gate forced the default
    pub gated: bool,
}

fn rule_matches(rule: &Rule, context: &EvaluationContext) -> bool {
    rule.filters.iter().all(|filter| filter_matches(filter, context))
}

/// Index of the first rule whose filters all match
pub fn matching_rule(parameter: &Parameter, context: &EvaluationContext) -> Option<usize> {
    parameter
        .rules
        .iter()
        .position(|rule| rule_matches(rule, context))
}

fn value_of(parameter: &Parameter, matched_rule: Option<usize>) -> Value {
    match matched_rule.and_then(|index| parameter.rules.get(index)) {
        Some(rule) => rule.value_when_matched.clone(),
        None => parameter.default_value.clone(),
    }
}

/// Resolve a parameter's value from its rules alone
pub fn resolve(parameter: &Parameter, context: &EvaluationContext) -> Value {
    value_of(parameter, matching_rule(parameter, context))
}

/// Resolve a parameter and apply the stage gate
pub fn evaluate(parameter: &Parameter, context: &EvaluationContext) -> Evaluation {
    if !StageGate::is_allowed(parameter.stage, context.environment) {
        debug!(
            "Parameter '{}' at stage {} is gated in {}",
            parameter.name, parameter.stage, context.environment
        );
        return Evaluation {
            value: parameter.default_value.clone(),
            matched_rule: None,
            gated: true,
        };
    }

    let matched_rule = matching_rule(parameter, context);
    let value = value_of(parameter, matched_rule);
    debug!(
        "Parameter '{}' resolved to {} (rule {:?})",
        parameter.name, value, matched_rule
    );

    Evaluation {
        value,
        matched_rule,
        gated: false,
    }
}
