//! API endpoint handlers
//!
//! HTTP request handlers for all REST API endpoints.

use super::extractors::JsonExtractor;
use super::types::*;
use crate::error::ServerError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use stagegate_sdk::{AuditRecord, Parameter, StageLists};
use tracing::{debug, info};

/// Health check endpoint
pub(super) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.gate.environment(),
        parameters: state.gate.parameters().len(),
    })
}

/// Evaluation endpoint
pub(super) async fn evaluate(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, ServerError> {
    let gate = &state.gate;

    if let Some(requested) = payload.environment {
        if requested != gate.environment() {
            return Err(ServerError::InvalidRequest(format!(
                "server runs in {}, request asked for {}",
                gate.environment(),
                requested
            )));
        }
    }

    let response = match payload.name {
        Some(name) => {
            let evaluation = gate.evaluate(&name, payload.attributes)?;
            EvaluateResponse::Single(ParameterEvaluation {
                name,
                value: evaluation.value,
                matched_rule: evaluation.matched_rule,
                gated: evaluation.gated,
            })
        }
        None => match payload.session_id {
            Some(session_id) => {
                let summary = gate.status_summary(&session_id, payload.attributes).await;
                EvaluateResponse::Summary(summary.as_ref().clone())
            }
            None => EvaluateResponse::Summary(gate.summary(payload.attributes)),
        },
    };

    Ok(Json(response))
}

/// List every parameter
pub(super) async fn list_parameters(State(state): State<AppState>) -> Json<Vec<Parameter>> {
    Json(
        state
            .gate
            .parameters()
            .iter()
            .map(|p| p.as_ref().clone())
            .collect(),
    )
}

/// One parameter
pub(super) async fn get_parameter(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Parameter>, ServerError> {
    let parameter = state.gate.get(&name)?;
    Ok(Json(parameter.as_ref().clone()))
}

/// Register a parameter
pub(super) async fn register_parameter(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<RegisterParameterRequest>,
) -> Result<(StatusCode, Json<Parameter>), ServerError> {
    info!("Registering parameter '{}'", payload.name);

    let parameter = state
        .gate
        .register(
            payload.name,
            payload.description,
            payload.stage,
            payload.default_value,
            payload.data_type,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(parameter.as_ref().clone())))
}

/// Replace a parameter's rules
pub(super) async fn update_rules(
    State(state): State<AppState>,
    Path(name): Path<String>,
    JsonExtractor(payload): JsonExtractor<UpdateRulesRequest>,
) -> Result<Json<AuditRecord>, ServerError> {
    info!(
        "Rule update for '{}' from {} ({} rule(s))",
        name,
        payload.committer,
        payload.rules.len()
    );

    let record = state
        .gate
        .update_rules(&name, &payload.committer, &payload.message, &payload.rules)
        .await?;
    Ok(Json(record))
}

/// Promote a parameter one stage forward
pub(super) async fn promote_stage(
    State(state): State<AppState>,
    Path(name): Path<String>,
    JsonExtractor(payload): JsonExtractor<PromoteStageRequest>,
) -> Result<Json<AuditRecord>, ServerError> {
    info!(
        "Stage promotion for '{}' to {} from {}",
        name, payload.stage, payload.committer
    );

    let record = state
        .gate
        .promote_stage(&name, &payload.committer, &payload.message, payload.stage)
        .await?;
    Ok(Json(record))
}

/// Audit trail of a parameter
pub(super) async fn audit_trail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<AuditRecord>>, ServerError> {
    Ok(Json(state.gate.audit_trail(&name).await?))
}

/// Compare the registry with declared stage lists
pub(super) async fn check_consistency(
    State(state): State<AppState>,
    JsonExtractor(lists): JsonExtractor<StageLists>,
) -> Json<ConsistencyResponse> {
    let report = state.gate.check_consistency(&lists);
    debug!(
        "Consistency check over {} declared name(s): {} discrepancy(ies)",
        lists.len(),
        report.discrepancies.len()
    );

    Json(ConsistencyResponse {
        pass: report.is_consistent(),
        discrepancies: report.discrepancies,
    })
}

/// End a session's cached summary
pub(super) async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<SessionResponse> {
    let ended = state.gate.end_session(&session_id).await;
    Json(SessionResponse { session_id, ended })
}
