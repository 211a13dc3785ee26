//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use stagegate_repository::MemoryStore;
use stagegate_sdk::{
    DataType, Environment, FeatureGate, FilterSpec, ParamName, PersistencePolicy, RuleSpec, Stage,
    Value,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Policy with no retries and a short timeout, so failure tests run fast
pub fn fast_policy() -> PersistencePolicy {
    PersistencePolicy::default()
        .with_timeout(Duration::from_millis(100))
        .with_retries(0)
        .with_backoff(Duration::ZERO)
}

/// Gate backed by a memory store the test can inspect and break
pub async fn gate_with_store(environment: Environment) -> (FeatureGate, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let gate = FeatureGate::builder()
        .with_environment(environment)
        .with_store(store.clone())
        .with_persistence(fast_policy())
        .build()
        .await
        .unwrap();
    (gate, store)
}

pub fn name(s: &str) -> ParamName {
    ParamName::new(s).unwrap()
}

/// Register a boolean parameter defaulting to false
pub async fn register_flag(gate: &FeatureGate, flag: &str, stage: Stage) {
    gate.register(name(flag), "", stage, Value::Bool(false), DataType::Bool)
        .await
        .unwrap();
}

/// `server_mode` filter matching any of the given environments
pub fn server_mode_in(envs: &[&str]) -> FilterSpec {
    envs.iter().fold(FilterSpec::new("server_mode"), |f, env| {
        f.condition("eq", vec![Value::from(*env)])
    })
}

/// Single rule turning a flag on in the given environments
pub fn enable_in(envs: &[&str]) -> Vec<RuleSpec> {
    vec![RuleSpec::new(true).filter(server_mode_in(envs))]
}

pub fn attrs(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
