//! Behavioural tests for evaluation, the registry and the status cache

use stagegate_core::{
    Condition, DataType, Environment, Filter, FilterType, FilterSpec, Operator, ParamName, Rule,
    RuleSpec, Stage, StageLists, Value,
};
use stagegate_runtime::{
    evaluate, resolve, validate_rules, Discrepancy, EvaluationContext, FeatureStatus,
    ParameterRegistry, RuntimeError, StatusCache,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn name(s: &str) -> ParamName {
    ParamName::new(s).unwrap()
}

fn ctx(env: Environment) -> EvaluationContext {
    EvaluationContext::new(env)
}

fn server_mode_in(envs: &[&str]) -> Filter {
    envs.iter().fold(Filter::new(FilterType::ServerMode), |f, env| {
        f.add_condition(Condition::eq(*env))
    })
}

// ========== Evaluation Properties ==========

#[test]
fn test_default_on_no_match() {
    let registry = ParameterRegistry::new();
    registry
        .register(name("p"), "", Stage::Prod, Value::Bool(false), DataType::Bool)
        .unwrap();
    registry
        .replace_rules("p", vec![Rule::new(true).with_filter(server_mode_in(&["dev"]))])
        .unwrap();

    let param = registry.get("p").unwrap();
    assert_eq!(resolve(&param, &ctx(Environment::Prod)), Value::Bool(false));
}

#[test]
fn test_first_match_wins() {
    let registry = ParameterRegistry::new();
    registry
        .register(name("p"), "", Stage::Prod, Value::Number(0.0), DataType::Number)
        .unwrap();
    registry
        .replace_rules(
            "p",
            vec![
                Rule::new(1.0).with_filter(server_mode_in(&["prod"])),
                Rule::new(2.0).with_filter(server_mode_in(&["prod"])),
            ],
        )
        .unwrap();

    let eval = evaluate(&registry.get("p").unwrap(), &ctx(Environment::Prod));
    assert_eq!(eval.value, Value::Number(1.0));
    assert_eq!(eval.matched_rule, Some(0));
}

#[test]
fn test_dev_stage_is_contained() {
    let registry = ParameterRegistry::new();
    registry
        .register(name("p"), "", Stage::Dev, Value::Bool(false), DataType::Bool)
        .unwrap();
    registry
        .replace_rules(
            "p",
            vec![Rule::new(true).with_filter(server_mode_in(&["dev", "test", "prod"]))],
        )
        .unwrap();
    let param = registry.get("p").unwrap();

    assert_eq!(evaluate(&param, &ctx(Environment::Dev)).value, Value::Bool(true));
    assert_eq!(evaluate(&param, &ctx(Environment::Test)).value, Value::Bool(false));
    assert_eq!(evaluate(&param, &ctx(Environment::Prod)).value, Value::Bool(false));
}

#[test]
fn test_filter_or_semantics() {
    let registry = ParameterRegistry::new();
    registry
        .register(name("p"), "", Stage::Prod, Value::Bool(false), DataType::Bool)
        .unwrap();
    registry
        .replace_rules("p", vec![Rule::new(true).with_filter(server_mode_in(&["dev", "test"]))])
        .unwrap();
    let param = registry.get("p").unwrap();

    assert_eq!(resolve(&param, &ctx(Environment::Dev)), Value::Bool(true));
    assert_eq!(resolve(&param, &ctx(Environment::Test)), Value::Bool(true));
    assert_eq!(resolve(&param, &ctx(Environment::Prod)), Value::Bool(false));
}

#[test]
fn test_rule_and_semantics() {
    let rules = validate_rules(
        &[RuleSpec::new(true)
            .filter(FilterSpec::new("server_mode").condition("=", vec!["test".into()]))
            .filter(FilterSpec::new("client_platform").condition("=", vec!["ios".into()]))],
        DataType::Bool,
    )
    .unwrap();

    let registry = ParameterRegistry::new();
    registry
        .register(name("p"), "", Stage::Prod, Value::Bool(false), DataType::Bool)
        .unwrap();
    registry.replace_rules("p", rules).unwrap();
    let param = registry.get("p").unwrap();

    let matching = ctx(Environment::Test).with_attribute("client_platform", "ios");
    let wrong_platform = ctx(Environment::Test).with_attribute("client_platform", "android");
    let wrong_env = ctx(Environment::Prod).with_attribute("client_platform", "ios");

    assert_eq!(resolve(&param, &matching), Value::Bool(true));
    assert_eq!(resolve(&param, &wrong_platform), Value::Bool(false));
    assert_eq!(resolve(&param, &wrong_env), Value::Bool(false));
}

#[test]
fn test_version_rule() {
    let rules = validate_rules(
        &[RuleSpec::new("new").filter(
            FilterSpec::new("app_version")
                .condition(">=", vec!["1.10.0".into()])
                .condition("in", vec!["0.9.0-beta.2".into()]),
        )],
        DataType::String,
    )
    .unwrap();
    let registry = ParameterRegistry::new();
    registry
        .register(name("ui"), "", Stage::Prod, Value::from("old"), DataType::String)
        .unwrap();
    registry.replace_rules("ui", rules).unwrap();
    let param = registry.get("ui").unwrap();

    let value_for = |version: &str| {
        resolve(&param, &ctx(Environment::Prod).with_attribute("app_version", version))
    };
    assert_eq!(value_for("1.9.3"), Value::from("old"));
    assert_eq!(value_for("1.10.0"), Value::from("new"));
    assert_eq!(value_for("0.9.0-beta.2"), Value::from("new"));
    assert_eq!(value_for("not a version"), Value::from("old"));
}

// ========== Registry ==========

#[test]
fn test_duplicate_and_unknown_errors() {
    let registry = ParameterRegistry::new();
    registry
        .register(name("p"), "", Stage::Dev, Value::Bool(false), DataType::Bool)
        .unwrap();

    assert!(matches!(
        registry.register(name("p"), "", Stage::Dev, Value::Bool(false), DataType::Bool),
        Err(RuntimeError::DuplicateParameter(_))
    ));
    assert!(matches!(
        registry.replace_rules("q", Vec::new()),
        Err(RuntimeError::UnknownParameter(_))
    ));
}

#[test]
fn test_consistency_detects_undeclared_name() {
    let registry = ParameterRegistry::new();
    registry
        .register(name("A"), "", Stage::Dev, Value::Bool(false), DataType::Bool)
        .unwrap();
    registry
        .register(name("B"), "", Stage::Dev, Value::Bool(false), DataType::Bool)
        .unwrap();

    let lists = StageLists::new().with(Stage::Dev, name("A"));
    let report = registry.check_consistency(&lists);

    assert!(!report.is_consistent());
    assert_eq!(report.discrepancies, vec![Discrepancy::Undeclared { name: name("B") }]);
}

#[test]
fn test_concurrent_readers_see_whole_rule_lists() {
    // every published rule list has rules all yielding the same value
    fn rules_of(value: f64) -> Vec<Rule> {
        (0..8)
            .map(|i| {
                Rule::new(value).with_filter(
                    Filter::new(FilterType::AppBuild)
                        .add_condition(Condition::compare(Operator::Ge, i as f64)),
                )
            })
            .collect()
    }

    let registry = Arc::new(ParameterRegistry::new());
    registry
        .register(name("p"), "", Stage::Prod, Value::Number(0.0), DataType::Number)
        .unwrap();
    registry.replace_rules("p", rules_of(1.0)).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let context = ctx(Environment::Prod).with_attribute("app_build", 100.0);
                while !done.load(Ordering::Relaxed) {
                    let param = registry.get("p").unwrap();
                    let first = &param.rules[0].value_when_matched;
                    assert_eq!(param.rules.len(), 8);
                    assert!(param.rules.iter().all(|r| &r.value_when_matched == first));
                    assert_eq!(&resolve(&param, &context), first);
                }
            })
        })
        .collect();

    for i in 0..500 {
        registry
            .replace_rules("p", rules_of(if i % 2 == 0 { 2.0 } else { 1.0 }))
            .unwrap();
    }
    done.store(true, Ordering::Relaxed);

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(registry.get("p").unwrap().revision, 501);
}

// ========== End to End ==========

#[tokio::test]
async fn test_test_stage_scenario_across_environments() {
    let registry = ParameterRegistry::new();
    registry
        .register(
            name("new_checkout"),
            "New checkout flow",
            Stage::Test,
            Value::Bool(false),
            DataType::Bool,
        )
        .unwrap();
    let rules = validate_rules(
        &[RuleSpec::new(true).filter(
            FilterSpec::new("server_mode")
                .condition("=", vec!["dev".into()])
                .condition("=", vec!["test".into()]),
        )],
        DataType::Bool,
    )
    .unwrap();
    registry.replace_rules("new_checkout", rules).unwrap();

    let cache = StatusCache::default();
    let expected = [
        (Environment::Dev, true),
        (Environment::Test, true),
        (Environment::Prod, false),
    ];
    for (env, enabled) in expected {
        let summary = cache
            .get_status_summary(env.as_str(), &registry, &ctx(env))
            .await;
        assert_eq!(
            summary.get("new_checkout"),
            Some(&FeatureStatus::Flag { is_enabled: enabled }),
            "environment {}",
            env
        );
    }
}
