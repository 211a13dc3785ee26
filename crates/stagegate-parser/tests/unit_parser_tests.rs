//! Unit tests for the parameter and stage-list parsers

use stagegate_core::{DataType, Stage, Value};
use stagegate_parser::*;

// =============================================================================
// Parameter Parser Tests
// =============================================================================

#[test]
fn test_parse_wrapped_parameter() {
    let yaml = r#"
parameter:
  name: new_checkout
  description: New checkout flow
  stage: test
  default: false
"#;

    let def = ParameterParser::parse(yaml).unwrap();
    assert_eq!(def.name.as_str(), "new_checkout");
    assert_eq!(def.description, "New checkout flow");
    assert_eq!(def.stage, Stage::Test);
    assert_eq!(def.data_type, DataType::Bool);
    assert_eq!(def.default_value, Value::Bool(false));
    assert!(def.rules.is_empty());
    assert_eq!(def.revision, 0);
}

#[test]
fn test_parse_bare_parameter_with_type() {
    let yaml = r#"
name: banner_color
stage: prod
type: string
default: blue
revision: 4
"#;

    let def = ParameterParser::parse(yaml).unwrap();
    assert_eq!(def.data_type, DataType::String);
    assert_eq!(def.default_value, Value::from("blue"));
    assert_eq!(def.revision, 4);
}

#[test]
fn test_parse_explicit_filters() {
    let yaml = r#"
parameter:
  name: new_checkout
  stage: test
  default: false
  rules:
    - filters:
        - type: server_mode
          conditions:
            - op: "="
              operands: dev
            - op: "="
              operands: test
        - filter_type: client_platform
          conditions:
            - operator: in
              operands: [ios, android]
      value: true
"#;

    let def = ParameterParser::parse(yaml).unwrap();
    assert_eq!(def.rules.len(), 1);

    let rule = &def.rules[0];
    assert_eq!(rule.value, Value::Bool(true));
    assert_eq!(rule.filters.len(), 2);
    assert_eq!(rule.filters[0].filter_type, "server_mode");
    assert_eq!(rule.filters[0].conditions.len(), 2);
    assert_eq!(rule.filters[0].conditions[1].operands, vec![Value::from("test")]);
    assert_eq!(rule.filters[1].conditions[0].operator, "in");
    assert_eq!(rule.filters[1].conditions[0].operands.len(), 2);
}

#[test]
fn test_parse_when_shorthand() {
    let yaml = r#"
parameter:
  name: new_checkout
  stage: prod
  default: false
  rules:
    - when:
        server_mode: [dev, test]
        app_version: ">= 2.1.0"
        app_build: 300
      value: true
"#;

    let def = ParameterParser::parse(yaml).unwrap();
    let filters = &def.rules[0].filters;
    assert_eq!(filters.len(), 3);

    assert_eq!(filters[0].filter_type, "server_mode");
    assert_eq!(filters[0].conditions.len(), 2);
    assert_eq!(filters[0].conditions[0].operator, "eq");

    assert_eq!(filters[1].conditions[0].operator, "ge");
    assert_eq!(filters[1].conditions[0].operands, vec![Value::from("2.1.0")]);

    assert_eq!(filters[2].conditions[0].operands, vec![Value::Number(300.0)]);
}

#[test]
fn test_parse_missing_default() {
    let yaml = "name: x\nstage: dev\n";
    let err = ParameterParser::parse(yaml).unwrap_err();
    assert!(matches!(err, ParseError::MissingField { field } if field == "default"));
}

#[test]
fn test_parse_missing_rule_value() {
    let yaml = r#"
name: x
stage: dev
default: false
rules:
  - when:
      server_mode: dev
"#;
    let err = ParameterParser::parse(yaml).unwrap_err();
    assert!(matches!(err, ParseError::MissingField { field } if field == "rules[0].value"));
}

#[test]
fn test_parse_invalid_stage_and_name() {
    let bad_stage = ParameterParser::parse("name: x\nstage: staging\ndefault: false\n");
    assert!(matches!(bad_stage, Err(ParseError::InvalidValue { field, .. }) if field == "stage"));

    let bad_name = ParameterParser::parse("name: 9lives\nstage: dev\ndefault: false\n");
    assert!(matches!(bad_name, Err(ParseError::InvalidValue { field, .. }) if field == "name"));
}

#[test]
fn test_parse_rules_must_be_a_list() {
    let err = ParameterParser::parse("name: x\nstage: dev\ndefault: false\nrules: yes\n");
    assert!(matches!(err, Err(ParseError::TypeMismatch { field, .. }) if field == "rules"));
}

#[test]
fn test_parse_all_documents() {
    let yaml = r#"
parameter:
  name: a
  stage: dev
  default: false
parameter:
  name: b
  stage: prod
  default: 3
---
name: c
stage: deprecated
default: true
"#;

    let defs = ParameterParser::parse_all(yaml).unwrap();
    let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(defs[1].default_value, Value::Number(3.0));
}

// =============================================================================
// Stage List Parser Tests
// =============================================================================

#[test]
fn test_parse_stage_lists() {
    let yaml = r#"
stages:
  dev: [search_v2]
  test: [new_checkout]
  prod: [dark_mode, banner_color]
"#;

    let lists = StageListParser::parse(yaml).unwrap();
    assert_eq!(lists.len(), 4);
    let declared: Vec<_> = lists.iter().map(|(s, n)| (s, n.as_str())).collect();
    assert_eq!(declared[0], (Stage::Dev, "search_v2"));
    assert_eq!(declared[3], (Stage::Prod, "banner_color"));
}
