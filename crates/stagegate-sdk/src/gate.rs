//! FeatureGate facade
//!
//! One owned object bundling the registry, the status cache and the update
//! service. Reads evaluate against immutable parameter snapshots and never
//! wait on writers; writes go through the [`UpdateService`].

use crate::audit::AuditLog;
use crate::builder::FeatureGateBuilder;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::update::UpdateService;
use stagegate_core::{
    AuditRecord, DataType, Environment, ParamName, Parameter, RuleSpec, Stage, StageLists, Value,
};
use stagegate_runtime::{
    evaluate, CacheStats, ConsistencyReport, Evaluation, EvaluationContext, ParameterRegistry,
    RuntimeError, StatusCache, StatusSummary,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Feature gating engine
pub struct FeatureGate {
    pub(crate) config: EngineConfig,
    pub(crate) registry: Arc<ParameterRegistry>,
    pub(crate) cache: StatusCache,
    pub(crate) updates: UpdateService,
    pub(crate) audit: Arc<AuditLog>,
}

impl FeatureGate {
    pub fn builder() -> FeatureGateBuilder {
        FeatureGateBuilder::new()
    }

    /// Environment every evaluation runs in
    pub fn environment(&self) -> Environment {
        self.config.environment
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ParameterRegistry> {
        &self.registry
    }

    /// Evaluation context for this process's environment
    pub fn context(&self, attributes: HashMap<String, Value>) -> EvaluationContext {
        EvaluationContext::new(self.config.environment).with_attributes(attributes)
    }

    // ========== Registry ==========

    /// Register a new parameter with no rules
    pub async fn register(
        &self,
        name: ParamName,
        description: impl Into<String>,
        stage: Stage,
        default_value: Value,
        data_type: DataType,
    ) -> Result<Arc<Parameter>> {
        let parameter = Parameter::new(name, description, stage, default_value, data_type);
        self.updates.register(parameter).await
    }

    /// Current snapshot of a parameter
    pub fn get(&self, name: &str) -> Result<Arc<Parameter>> {
        Ok(self.registry.get(name)?)
    }

    /// Every parameter, sorted by name
    pub fn parameters(&self) -> Vec<Arc<Parameter>> {
        self.registry.snapshot()
    }

    // ========== Evaluation ==========

    /// Evaluate one parameter
    pub fn evaluate(&self, name: &str, attributes: HashMap<String, Value>) -> Result<Evaluation> {
        let parameter = self.registry.get(name)?;
        let evaluation = evaluate(&parameter, &self.context(attributes));
        debug!(
            "Evaluated '{}' -> {} (rule {:?}, gated {})",
            name, evaluation.value, evaluation.matched_rule, evaluation.gated
        );
        Ok(evaluation)
    }

    /// Whether a parameter is on
    ///
    /// Boolean parameters report their value; any other parameter is enabled
    /// when its effective value differs from its default.
    pub fn is_enabled(&self, name: &str, attributes: HashMap<String, Value>) -> Result<bool> {
        let parameter = self.registry.get(name)?;
        let value = evaluate(&parameter, &self.context(attributes)).value;
        Ok(match value {
            Value::Bool(enabled) => enabled,
            other => other != parameter.default_value,
        })
    }

    /// Status of every non-deprecated parameter, cached per session
    pub async fn status_summary(
        &self,
        session_id: &str,
        attributes: HashMap<String, Value>,
    ) -> Arc<StatusSummary> {
        self.cache
            .get_status_summary(session_id, &self.registry, &self.context(attributes))
            .await
    }

    /// Status of every non-deprecated parameter, evaluated now and not cached
    pub fn summary(&self, attributes: HashMap<String, Value>) -> StatusSummary {
        StatusSummary::build(&self.registry, &self.context(attributes))
    }

    /// Drop a session's cached summary
    pub async fn end_session(&self, session_id: &str) -> bool {
        self.cache.invalidate(session_id).await
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    // ========== Administration ==========

    /// Validate and publish a new rule list
    pub async fn update_rules(
        &self,
        name: &str,
        committer: &str,
        message: &str,
        rules: &[RuleSpec],
    ) -> Result<AuditRecord> {
        self.updates
            .update_rules(name, committer, message, rules)
            .await
    }

    /// Move a parameter one stage forward
    pub async fn promote_stage(
        &self,
        name: &str,
        committer: &str,
        message: &str,
        target: Stage,
    ) -> Result<AuditRecord> {
        self.updates
            .promote_stage(name, committer, message, target)
            .await
    }

    /// A parameter's audit records in commit order
    pub async fn audit_trail(&self, name: &str) -> Result<Vec<AuditRecord>> {
        let records = self.audit.records_for(name).await;
        if records.is_empty() && !self.registry.contains(name) {
            return Err(RuntimeError::UnknownParameter(name.to_string()).into());
        }
        Ok(records)
    }

    // ========== Consistency ==========

    /// Compare the registry with declared stage lists
    pub fn check_consistency(&self, expected: &StageLists) -> ConsistencyReport {
        self.registry.check_consistency(expected)
    }

    /// Fail unless the registry matches the declared stage lists
    pub fn validate_consistency(&self, expected: &StageLists) -> Result<()> {
        Ok(self.registry.validate_consistency(expected)?)
    }
}
