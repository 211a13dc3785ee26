//! Unit tests for the parameter and rule model
//!
//! Covers serialization shapes used by stores and the HTTP surface.

use stagegate_core::{
    AuditRecord, Condition, DataType, Filter, FilterType, Operator, ParamName, Parameter,
    ParameterDefinition, Rule, RuleSpec, Stage, StageLists, Value,
};

fn checkout() -> Parameter {
    Parameter::new(
        ParamName::new("new_checkout").unwrap(),
        "New checkout flow",
        Stage::Test,
        Value::Bool(false),
        DataType::Bool,
    )
}

#[test]
fn test_parameter_json_shape() {
    let param = checkout().with_rules(vec![Rule::new(true).with_filter(
        Filter::new(FilterType::ServerMode).add_condition(Condition::eq("test")),
    )]);

    let json = serde_json::to_value(&param).unwrap();
    assert_eq!(json["name"], "new_checkout");
    assert_eq!(json["stage"], "test");
    assert_eq!(json["data_type"], "bool");
    assert_eq!(json["default_value"], false);
    assert_eq!(json["rules"][0]["filters"][0]["filter_type"], "server_mode");
    assert_eq!(json["rules"][0]["filters"][0]["conditions"][0]["operator"], "eq");
    assert_eq!(json["rules"][0]["value_when_matched"], true);
}

#[test]
fn test_definition_yaml_round_trip_keeps_rules() {
    let param = checkout().with_rules(vec![
        Rule::new(true).with_filter(
            Filter::new(FilterType::AppVersion)
                .add_condition(Condition::compare(Operator::Ge, "2.10.0")),
        ),
        Rule::new(false),
    ]);

    let yaml = serde_yaml::to_string(&ParameterDefinition::from(&param)).unwrap();
    let parsed: ParameterDefinition = serde_yaml::from_str(&yaml).unwrap();

    assert_eq!(parsed.rules.len(), 2);
    assert_eq!(parsed.rules[0], RuleSpec::from(&param.rules[0]));
    assert_eq!(parsed.rules[0].filters[0].conditions[0].operands, vec![Value::from("2.10.0")]);
    assert_eq!(parsed.revision, 1);
}

#[test]
fn test_stage_lists_yaml() {
    let yaml = r#"
dev: [a]
prod: [b, c]
"#;
    let lists: StageLists = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(lists.dev.len(), 1);
    assert!(lists.test.is_empty());
    assert_eq!(lists.list(Stage::Prod).len(), 2);
    assert!(lists.deprecated.is_empty());
}

#[test]
fn test_stage_lists_reject_invalid_names() {
    let yaml = "dev: [\"not valid\"]\n";
    assert!(serde_yaml::from_str::<StageLists>(yaml).is_err());
}

#[test]
fn test_audit_record_serializes_without_stage_change() {
    let record = AuditRecord::rules_updated(&checkout(), "alice", "initial rules");
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["parameter"], "new_checkout");
    assert_eq!(json["committer"], "alice");
    assert!(json.get("stage_change").is_none());

    let back: AuditRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, record);
}
