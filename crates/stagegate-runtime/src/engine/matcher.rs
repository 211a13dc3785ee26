//! Condition matching
//!
//! Compares one attribute value against one [`Condition`] under the attribute's
//! declared [`AttributeKind`]. Matching is pure: the same inputs always give the
//! same answer.

use crate::error::{Result, RuntimeError};
use stagegate_core::{AttributeKind, Condition, Environment, Operator, SemanticVersion, Value};
use std::cmp::Ordering;

/// Check that a condition is well formed for an attribute kind
///
/// Verifies operand count, that ordering operators are only used on ordered
/// kinds, and that every operand has the kind's type.
pub fn check_condition(condition: &Condition, kind: AttributeKind) -> Result<()> {
    let operator = condition.operator;
    let count = condition.operands.len();

    if !operator.accepts_operand_count(count) {
        let expected = if operator.is_membership() {
            "at least one operand"
        } else {
            "exactly one operand"
        };
        return Err(RuntimeError::malformed_condition(format!(
            "operator '{}' takes {}, got {}",
            operator, expected, count
        )));
    }

    if operator.is_ordering() && !kind.is_ordered() {
        return Err(RuntimeError::malformed_condition(format!(
            "operator '{}' is not supported for {} attributes",
            operator, kind
        )));
    }

    for operand in &condition.operands {
        check_operand(operand, kind)?;
    }
    Ok(())
}

fn check_operand(operand: &Value, kind: AttributeKind) -> Result<()> {
    match kind {
        AttributeKind::Environment => environment_operand(operand).map(|_| ()),
        AttributeKind::Discrete => discrete_operand(operand).map(|_| ()),
        AttributeKind::Version => version_operand(operand).map(|_| ()),
        AttributeKind::Number => number_operand(operand).map(|_| ()),
    }
}

/// Evaluate a condition against an attribute value
///
/// Returns `Ok(false)` for a null attribute and `MalformedCondition` when the
/// condition or the attribute does not fit the declared kind.
pub fn matches(condition: &Condition, attribute: &Value, kind: AttributeKind) -> Result<bool> {
    if attribute.is_null() {
        return Ok(false);
    }
    check_condition(condition, kind)?;

    let operator = condition.operator;
    let operands = &condition.operands;

    match kind {
        AttributeKind::Environment => {
            let attr = attribute
                .as_str()
                .and_then(|s| s.parse::<Environment>().ok())
                .ok_or_else(|| attribute_mismatch(attribute, kind))?;
            let operands = operands
                .iter()
                .map(environment_operand)
                .collect::<Result<Vec<_>>>()?;
            Ok(apply(operator, &attr, &operands, |a, b| (a == b).then_some(Ordering::Equal)))
        }
        AttributeKind::Discrete => {
            let attr = attribute
                .as_str()
                .ok_or_else(|| attribute_mismatch(attribute, kind))?;
            let operands = operands
                .iter()
                .map(discrete_operand)
                .collect::<Result<Vec<_>>>()?;
            Ok(apply(operator, &attr, &operands, |a, b| (a == b).then_some(Ordering::Equal)))
        }
        AttributeKind::Version => {
            let attr = attribute
                .as_str()
                .and_then(|s| SemanticVersion::parse(s).ok())
                .ok_or_else(|| attribute_mismatch(attribute, kind))?;
            let operands = operands
                .iter()
                .map(version_operand)
                .collect::<Result<Vec<_>>>()?;
            Ok(apply(operator, &attr, &operands, |a, b| Some(a.cmp(b))))
        }
        AttributeKind::Number => {
            let attr = match attribute {
                Value::Number(n) => Some(*n),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .ok_or_else(|| attribute_mismatch(attribute, kind))?;
            let operands = operands
                .iter()
                .map(number_operand)
                .collect::<Result<Vec<_>>>()?;
            Ok(apply(operator, &attr, &operands, |a, b| a.partial_cmp(b)))
        }
    }
}

/// Apply an operator given a comparison function
///
/// `compare` returns `None` for incomparable values, which never satisfy an
/// ordering or equality test.
fn apply<T>(
    operator: Operator,
    attr: &T,
    operands: &[T],
    compare: impl Fn(&T, &T) -> Option<Ordering>,
) -> bool {
    let equal = |operand: &T| compare(attr, operand) == Some(Ordering::Equal);
    let first = match operands.first() {
        Some(first) => first,
        None => return false,
    };

    match operator {
        Operator::Eq => equal(first),
        Operator::Ne => !equal(first),
        Operator::Gt => compare(attr, first) == Some(Ordering::Greater),
        Operator::Ge => matches!(
            compare(attr, first),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Lt => compare(attr, first) == Some(Ordering::Less),
        Operator::Le => matches!(compare(attr, first), Some(Ordering::Less | Ordering::Equal)),
        Operator::In => operands.iter().any(equal),
        Operator::NotIn => !operands.iter().any(equal),
    }
}

fn attribute_mismatch(attribute: &Value, kind: AttributeKind) -> RuntimeError {
    RuntimeError::malformed_condition(format!(
        "attribute value {} is not a valid {}",
        attribute, kind
    ))
}

fn operand_mismatch(operand: &Value, kind: AttributeKind) -> RuntimeError {
    RuntimeError::malformed_condition(format!(
        "operand {} ({}) is not a valid {} operand",
        operand,
        operand.type_name(),
        kind
    ))
}

fn environment_operand(operand: &Value) -> Result<Environment> {
    operand
        .as_str()
        .and_then(|s| s.parse::<Environment>().ok())
        .ok_or_else(|| operand_mismatch(operand, AttributeKind::Environment))
}

fn discrete_operand(operand: &Value) -> Result<&str> {
    operand
        .as_str()
        .ok_or_else(|| operand_mismatch(operand, AttributeKind::Discrete))
}

fn version_operand(operand: &Value) -> Result<SemanticVersion> {
    operand
        .as_str()
        .and_then(|s| SemanticVersion::parse(s).ok())
        .ok_or_else(|| operand_mismatch(operand, AttributeKind::Version))
}

fn number_operand(operand: &Value) -> Result<f64> {
    operand
        .as_f64()
        .ok_or_else(|| operand_mismatch(operand, AttributeKind::Number))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(op: Operator, operand: &str, attr: &str) -> bool {
        matches(
            &Condition::compare(op, operand),
            &Value::from(attr),
            AttributeKind::Version,
        )
        .unwrap()
    }

    #[test]
    fn test_discrete_equality() {
        let kind = AttributeKind::Discrete;
        assert!(matches(&Condition::eq("ios"), &Value::from("ios"), kind).unwrap());
        assert!(!matches(&Condition::eq("ios"), &Value::from("android"), kind).unwrap());
        assert!(matches(&Condition::ne("ios"), &Value::from("android"), kind).unwrap());
    }

    #[test]
    fn test_membership() {
        let kind = AttributeKind::Discrete;
        let cond = Condition::one_of(["en_US", "en_GB"]);
        assert!(matches(&cond, &Value::from("en_GB"), kind).unwrap());
        assert!(!matches(&cond, &Value::from("de_DE"), kind).unwrap());

        let excluded = Condition::new(Operator::NotIn, vec![Value::from("de_DE")]);
        assert!(matches(&excluded, &Value::from("en_US"), kind).unwrap());
        assert!(!matches(&excluded, &Value::from("de_DE"), kind).unwrap());
    }

    #[test]
    fn test_environment_is_case_insensitive() {
        let kind = AttributeKind::Environment;
        assert!(matches(&Condition::eq("TEST"), &Value::from("test"), kind).unwrap());
        assert!(matches!(
            matches(&Condition::eq("staging"), &Value::from("test"), kind),
            Err(RuntimeError::MalformedCondition { .. })
        ));
    }

    #[test]
    fn test_version_ordering_is_semantic() {
        assert!(version(Operator::Gt, "1.9.0", "1.10.0"));
        assert!(!version(Operator::Lt, "1.9.0", "1.10.0"));
        assert!(version(Operator::Ge, "2.1", "2.1.0"));
        assert!(version(Operator::Eq, "v2.1.0", "2.1.0+build.7"));
        assert!(version(Operator::Lt, "2.0.0", "2.0.0-rc.1"));
        assert!(version(Operator::Le, "2.0.0", "2.0.0"));
    }

    #[test]
    fn test_number_ordering() {
        let kind = AttributeKind::Number;
        let cond = Condition::compare(Operator::Ge, 300.0);
        assert!(matches(&cond, &Value::Number(300.0), kind).unwrap());
        assert!(matches(&cond, &Value::from("301"), kind).unwrap());
        assert!(!matches(&cond, &Value::Number(299.0), kind).unwrap());
    }

    #[test]
    fn test_null_attribute_never_matches() {
        let cond = Condition::new(Operator::NotIn, vec![Value::from("x")]);
        assert!(!matches(&cond, &Value::Null, AttributeKind::Discrete).unwrap());
    }

    #[test]
    fn test_ordering_on_discrete_is_malformed() {
        let err = matches(
            &Condition::compare(Operator::Gt, "a"),
            &Value::from("b"),
            AttributeKind::Discrete,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not supported for string attributes"));
    }

    #[test]
    fn test_operand_type_mismatch() {
        // version operands must be strings
        let numeric = Condition::compare(Operator::Ge, 2.0);
        assert!(check_condition(&numeric, AttributeKind::Version).is_err());

        let bad_version = Condition::compare(Operator::Ge, "two");
        assert!(check_condition(&bad_version, AttributeKind::Version).is_err());

        let string_number = Condition::compare(Operator::Ge, "300");
        assert!(check_condition(&string_number, AttributeKind::Number).is_err());
    }

    #[test]
    fn test_operand_count() {
        let none = Condition::new(Operator::In, Vec::new());
        assert!(check_condition(&none, AttributeKind::Discrete).is_err());

        let two = Condition::new(Operator::Eq, vec![Value::from("a"), Value::from("b")]);
        assert!(check_condition(&two, AttributeKind::Discrete).is_err());
    }

    #[test]
    fn test_incompatible_attribute() {
        let err = matches(
            &Condition::compare(Operator::Ge, "1.0.0"),
            &Value::from("latest"),
            AttributeKind::Version,
        );
        assert!(matches!(err, Err(RuntimeError::MalformedCondition { location: None, .. })));
    }
}
