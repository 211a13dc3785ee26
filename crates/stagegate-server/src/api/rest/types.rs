//! REST API type definitions
//!
//! Request and response types for the REST API endpoints.

use serde::{Deserialize, Serialize};
use stagegate_sdk::{
    DataType, Discrepancy, Environment, FeatureGate, ParamName, RuleSpec, Stage, StatusSummary,
    Value,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<FeatureGate>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: Environment,
    pub parameters: usize,
}

/// Evaluation request
///
/// With `name`, one parameter is evaluated; without it the full status
/// summary is returned, cached per `session_id` when one is given.
#[derive(Debug, Default, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub session_id: Option<String>,

    /// Must match the server's environment when given
    #[serde(default)]
    pub environment: Option<Environment>,

    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}

/// Result of evaluating one parameter
#[derive(Debug, Serialize, Deserialize)]
pub struct ParameterEvaluation {
    pub name: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<usize>,
    pub gated: bool,
}

/// Evaluation response
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum EvaluateResponse {
    Single(ParameterEvaluation),
    Summary(StatusSummary),
}

/// New parameter
#[derive(Debug, Deserialize)]
pub struct RegisterParameterRequest {
    pub name: ParamName,
    #[serde(default)]
    pub description: String,
    pub stage: Stage,
    #[serde(default = "default_data_type", alias = "type")]
    pub data_type: DataType,
    #[serde(rename = "default", alias = "default_value")]
    pub default_value: Value,
}

fn default_data_type() -> DataType {
    DataType::Bool
}

/// Rule replacement
#[derive(Debug, Deserialize)]
pub struct UpdateRulesRequest {
    pub committer: String,
    #[serde(default)]
    pub message: String,
    pub rules: Vec<RuleSpec>,
}

/// Stage promotion
#[derive(Debug, Deserialize)]
pub struct PromoteStageRequest {
    pub committer: String,
    #[serde(default)]
    pub message: String,
    pub stage: Stage,
}

/// Consistency check result
#[derive(Debug, Serialize)]
pub struct ConsistencyResponse {
    pub pass: bool,
    pub discrepancies: Vec<Discrepancy>,
}

/// Session termination result
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub ended: bool,
}
