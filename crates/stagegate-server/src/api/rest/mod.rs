//! REST API implementation
//!
//! - types: Request/response type definitions
//! - extractors: Custom request extractors
//! - handlers: API endpoint handlers
//! - router: Router creation and configuration

mod extractors;
mod handlers;
mod router;
pub mod types;

// Re-export public API
pub use extractors::JsonExtractor;
pub use router::create_router;
pub use types::{
    AppState, ConsistencyResponse, EvaluateRequest, EvaluateResponse, HealthResponse,
    ParameterEvaluation, PromoteStageRequest, RegisterParameterRequest, SessionResponse,
    UpdateRulesRequest,
};
