//! Stage Gating Example
//!
//! Loads three parameters at different stages from inline YAML and evaluates
//! them as a dev, a test and a prod process would.
//!
//! Key concepts:
//! - A dev-stage parameter only ever takes its rule values in dev
//! - A test-stage parameter is live in dev and test
//! - Deprecated parameters are left out of the status summary

use stagegate_sdk::{Environment, FeatureGate, Value};
use std::collections::HashMap;

const DEFINITIONS: &str = r#"
parameter:
  name: new_checkout
  description: Redesigned checkout flow
  stage: test
  default: false
  rules:
    - when:
        server_mode: [dev, test]
      value: true
---
parameter:
  name: search_v2
  description: Experimental search backend
  stage: dev
  default: false
  rules:
    - when:
        server_mode: [dev, test, prod]
      value: true
---
parameter:
  name: max_cart_items
  stage: prod
  type: number
  default: 20
  rules:
    - when:
        client_platform: ios
        app_version: ">= 2.1.0"
      value: 50
---
parameter:
  name: legacy_banner
  stage: deprecated
  default: true
"#;

const STAGE_LISTS: &str = r#"
stages:
  dev: [search_v2]
  test: [new_checkout]
  prod: [max_cart_items]
  deprecated: [legacy_banner]
"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    println!("=== Stage Gating Example ===\n");

    for environment in Environment::ALL {
        let gate = FeatureGate::builder()
            .with_environment(environment)
            .add_definition_content(DEFINITIONS)
            .with_stage_list_content(STAGE_LISTS)
            .strict_consistency(true)
            .build()
            .await?;

        println!("--- {} process ---", environment);
        for name in ["new_checkout", "search_v2"] {
            let evaluation = gate.evaluate(name, HashMap::new())?;
            println!(
                "  {:<15} {:<6} {}",
                name,
                evaluation.value,
                if evaluation.gated { "(gated by stage)" } else { "" }
            );
        }

        let ios = HashMap::from([
            ("client_platform".to_string(), Value::from("ios")),
            ("app_version".to_string(), Value::from("2.3.1")),
        ]);
        println!(
            "  {:<15} {} (ios 2.3.1), {} (no attributes)",
            "max_cart_items",
            gate.evaluate("max_cart_items", ios)?.value,
            gate.evaluate("max_cart_items", HashMap::new())?.value
        );

        let summary = gate.summary(HashMap::new());
        println!("  summary: {}\n", serde_json::to_string(&summary.features)?);
    }

    println!("=== Example completed ===");
    Ok(())
}
