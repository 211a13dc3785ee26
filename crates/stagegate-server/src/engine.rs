//! Feature gate initialization
//!
//! Converts server configuration into an SDK builder and loads the gate.

use crate::config::ServerConfig;
use anyhow::{Context, Result};
use stagegate_sdk::{FeatureGate, StageListParser, StageLists};
use tracing::info;

/// Initialize the feature gate from server configuration
pub async fn init_gate(config: &ServerConfig) -> Result<FeatureGate> {
    let mut builder = FeatureGate::builder()
        .with_config(config.engine_config())
        .strict_consistency(config.strict_consistency);

    if let Some(path) = &config.stage_list_file {
        builder = builder.with_stage_lists(load_stage_lists(path)?);
    }

    let gate = builder
        .build()
        .await
        .context("Failed to initialize feature gate")?;

    info!(
        "Feature gate ready: {} parameter(s), environment {}",
        gate.parameters().len(),
        gate.environment()
    );
    Ok(gate)
}

/// Read and parse a stage-list document
pub fn load_stage_lists(path: &std::path::Path) -> Result<StageLists> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read stage list file {}", path.display()))?;
    StageListParser::parse(&content)
        .with_context(|| format!("Failed to parse stage list file {}", path.display()))
}
