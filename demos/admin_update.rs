//! Administrative Update Example
//!
//! Drives the write path: registration, rule replacement, a rejected update,
//! stage promotion and the resulting audit trail. Everything is persisted to
//! a store under a temporary directory.

use stagegate_sdk::{
    DataType, Environment, FeatureGate, FilterSpec, ParamName, RepositoryConfig, RuleSpec,
    SdkError, Stage, Value,
};
use std::collections::HashMap;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    println!("=== Administrative Update Example ===\n");

    let root = std::env::temp_dir().join("stagegate-admin-demo");
    if root.exists() {
        std::fs::remove_dir_all(&root)?;
    }
    let repository = RepositoryConfig::file_system(root.to_string_lossy().to_string());

    let gate = FeatureGate::builder()
        .with_environment(Environment::Test)
        .with_repository(repository.clone())
        .build()
        .await?;

    // Register
    let name = ParamName::new("new_checkout")?;
    gate.register(name, "Redesigned checkout flow", Stage::Dev, Value::Bool(false), DataType::Bool)
        .await?;
    println!("Registered new_checkout at stage dev");

    // Replace the rules
    let rules = vec![RuleSpec::new(true).filter(
        FilterSpec::new("server_mode")
            .condition("eq", vec![Value::from("dev")])
            .condition("eq", vec![Value::from("test")]),
    )];
    let record = gate
        .update_rules("new_checkout", "alice", "enable outside prod", &rules)
        .await?;
    println!("Rules updated to revision {} by {}", record.revision, record.committer);
    println!(
        "  evaluated in test: {} (still gated at dev)",
        gate.evaluate("new_checkout", HashMap::new())?.value
    );

    // A malformed update is rejected whole
    let bad = vec![
        rules[0].clone(),
        RuleSpec::new(true).filter(FilterSpec::new("moon_phase").condition("eq", vec![Value::from("full")])),
    ];
    match gate.update_rules("new_checkout", "mallory", "", &bad).await {
        Err(SdkError::Runtime(e)) if e.is_validation() => {
            println!("Rejected update: {}", e);
        }
        other => println!("Unexpected result: {:?}", other.map(|r| r.revision)),
    }

    // Promote one stage at a time
    match gate.promote_stage("new_checkout", "bob", "skip", Stage::Prod).await {
        Err(e) => println!("Rejected promotion: {}", e),
        Ok(_) => println!("Unexpected promotion"),
    }
    gate.promote_stage("new_checkout", "bob", "ready for QA", Stage::Test)
        .await?;
    println!(
        "Promoted to test; evaluated in test: {}",
        gate.evaluate("new_checkout", HashMap::new())?.value
    );

    // Reload from the store
    let reloaded = FeatureGate::builder()
        .with_environment(Environment::Test)
        .with_repository(repository)
        .build()
        .await?;
    println!("\nAfter restart:");
    println!(
        "  evaluated in test: {}",
        reloaded.evaluate("new_checkout", HashMap::new())?.value
    );
    for record in reloaded.audit_trail("new_checkout").await? {
        println!(
            "  r{} {} by {}: {}",
            record.revision,
            record.committed_at.format("%H:%M:%S"),
            record.committer,
            record.message
        );
    }

    std::fs::remove_dir_all(&root)?;
    println!("\n=== Example completed ===");
    Ok(())
}
