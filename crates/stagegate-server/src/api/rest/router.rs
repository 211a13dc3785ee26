//! Router creation and configuration
//!
//! Creates the Axum router for the REST API endpoints.

use super::handlers::*;
use super::types::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use stagegate_sdk::FeatureGate;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create REST API router
pub fn create_router(gate: Arc<FeatureGate>) -> Router {
    let state = AppState { gate };

    Router::new()
        .route("/health", get(health))
        .route("/v1/evaluate", post(evaluate))
        .route(
            "/v1/parameters",
            get(list_parameters).post(register_parameter),
        )
        .route("/v1/parameters/:name", get(get_parameter))
        .route("/v1/parameters/:name/rules", put(update_rules))
        .route("/v1/parameters/:name/stage", post(promote_stage))
        .route("/v1/parameters/:name/audit", get(audit_trail))
        .route("/v1/consistency", post(check_consistency))
        .route("/v1/sessions/:id", delete(end_session))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
