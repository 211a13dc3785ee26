//! Update service
//!
//! The only write path into the registry. Every write for a given parameter
//! name runs under that name's lock, so updates to one parameter are applied
//! in order while different parameters update concurrently. A write is made
//! durable first and published second: if the store call fails, the registry
//! is left untouched and the durable copy is put back to the previous state,
//! since a save that timed out may still have landed.

use stagegate_core::{AuditRecord, CoreError, ParamName, Parameter, RuleSpec, Stage};
use stagegate_repository::ParameterStore;
use stagegate_runtime::{validate_rules, ParameterRegistry, RuntimeError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{error, info, warn};

use crate::audit::AuditLog;
use crate::config::PersistencePolicy;
use crate::error::{Result, SdkError};

/// Validating, persisting writer for the parameter registry
pub struct UpdateService {
    registry: Arc<ParameterRegistry>,
    store: Option<Arc<dyn ParameterStore>>,
    policy: PersistencePolicy,
    audit: Arc<AuditLog>,
    locks: Mutex<HashMap<ParamName, Arc<AsyncMutex<()>>>>,
}

impl UpdateService {
    pub fn new(
        registry: Arc<ParameterRegistry>,
        store: Option<Arc<dyn ParameterStore>>,
        policy: PersistencePolicy,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self {
            registry,
            store,
            policy,
            audit,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Write lock for one parameter name
    fn lock_for(&self, name: &ParamName) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(name.clone()).or_default())
    }

    /// Register a new parameter, persisting it first
    pub async fn register(&self, parameter: Parameter) -> Result<Arc<Parameter>> {
        let lock = self.lock_for(&parameter.name);
        let _guard = lock.lock().await;

        if self.registry.contains(parameter.name.as_str()) {
            return Err(RuntimeError::DuplicateParameter(parameter.name).into());
        }
        if !parameter.data_type.accepts(&parameter.default_value) {
            return Err(RuntimeError::from(CoreError::TypeError(format!(
                "default value {} of '{}' is not a {}",
                parameter.default_value, parameter.name, parameter.data_type
            )))
            .into());
        }

        self.commit(&parameter, None).await?;
        Ok(self.registry.insert(parameter)?)
    }

    /// Validate and atomically replace a parameter's rule list
    ///
    /// The whole update is rejected when any rule fails validation; the error
    /// names the offending rule, filter or condition.
    pub async fn update_rules(
        &self,
        name: &str,
        committer: &str,
        message: &str,
        rules: &[RuleSpec],
    ) -> Result<AuditRecord> {
        require_committer(committer)?;
        let current = self.registry.get(name)?;
        let validated = validate_rules(rules, current.data_type)?;

        let lock = self.lock_for(&current.name);
        let _guard = lock.lock().await;

        // re-read under the lock so revisions stay sequential
        let current = self.registry.get(name)?;
        let staged = current.with_rules(validated.clone());

        self.commit(&staged, Some(&current)).await?;
        let updated = self.registry.replace_rules(name, validated)?;

        info!(
            "Updated rules of '{}' to revision {} ({} rule(s), committer {})",
            updated.name,
            updated.revision,
            updated.rules.len(),
            committer
        );

        let record = AuditRecord::rules_updated(&updated, committer, message);
        self.record(record.clone()).await;
        Ok(record)
    }

    /// Move a parameter exactly one stage forward
    pub async fn promote_stage(
        &self,
        name: &str,
        committer: &str,
        message: &str,
        target: Stage,
    ) -> Result<AuditRecord> {
        require_committer(committer)?;
        let current = self.registry.get(name)?;

        let lock = self.lock_for(&current.name);
        let _guard = lock.lock().await;

        let current = self.registry.get(name)?;
        if current.stage.next() != Some(target) {
            return Err(SdkError::StageTransition {
                name: current.name.clone(),
                from: current.stage,
                to: target,
            });
        }
        let updated = current.with_stage(target);

        self.commit(&updated, Some(&current)).await?;
        self.registry.publish(updated.clone())?;

        info!(
            "Promoted '{}' from {} to {} (committer {})",
            updated.name, current.stage, target, committer
        );

        let record = AuditRecord::stage_promoted(&updated, current.stage, committer, message);
        self.record(record.clone()).await;
        Ok(record)
    }

    /// Save a new revision, restoring the previous durable state on failure
    ///
    /// `previous` is written back, or the definition removed when there was
    /// none, so a late save cannot resurface after a restart.
    async fn commit(&self, parameter: &Parameter, previous: Option<&Parameter>) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let operation = format!("save '{}'", parameter.name);
        let err = match self
            .policy
            .run(&operation, || store.save_parameter(parameter))
            .await
        {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        warn!(
            "Revision {} of '{}' was not applied: {}",
            parameter.revision, parameter.name, err
        );

        let restored = match previous {
            Some(previous) => {
                let operation = format!("restore '{}'", previous.name);
                self.policy
                    .run(&operation, || store.save_parameter(previous))
                    .await
            }
            None => {
                let operation = format!("discard '{}'", parameter.name);
                self.policy
                    .run(&operation, || store.remove_parameter(&parameter.name))
                    .await
            }
        };
        if let Err(e) = restored {
            error!(
                "Durable copy of '{}' may still hold unapplied revision {}: {}",
                parameter.name, parameter.revision, e
            );
        }
        Err(err)
    }

    /// Keep the record in memory and append it to the store
    ///
    /// The parameter change is already durable at this point, so a failed
    /// append is logged instead of undoing the commit.
    async fn record(&self, record: AuditRecord) {
        if let Some(store) = &self.store {
            let operation = format!("append audit for '{}'", record.parameter);
            if let Err(e) = self
                .policy
                .run(&operation, || store.append_audit(&record))
                .await
            {
                warn!("Audit record {} kept in memory only: {}", record.id, e);
            }
        }
        self.audit.append(record).await;
    }
}

fn require_committer(committer: &str) -> Result<()> {
    if committer.trim().is_empty() {
        return Err(SdkError::InvalidRequest(
            "committer must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagegate_core::{DataType, FilterSpec, Value};
    use stagegate_repository::MemoryStore;
    use std::time::Duration;

    fn service(store: Arc<MemoryStore>) -> UpdateService {
        UpdateService::new(
            Arc::new(ParameterRegistry::new()),
            Some(store),
            PersistencePolicy::default()
                .with_retries(0)
                .with_timeout(Duration::from_millis(200)),
            Arc::new(AuditLog::new()),
        )
    }

    fn param(name: &str, stage: Stage) -> Parameter {
        Parameter::new(
            ParamName::new(name).unwrap(),
            "",
            stage,
            Value::Bool(false),
            DataType::Bool,
        )
    }

    fn enable_in_test() -> Vec<RuleSpec> {
        vec![RuleSpec::new(true)
            .filter(FilterSpec::new("server_mode").condition("eq", vec!["test".into()]))]
    }

    #[tokio::test]
    async fn test_register_persists() {
        let store = Arc::new(MemoryStore::new());
        let service = service(Arc::clone(&store));

        service.register(param("p", Stage::Dev)).await.unwrap();
        assert!(store.stored("p").await.is_some());

        let err = service.register(param("p", Stage::Dev)).await.unwrap_err();
        assert!(matches!(
            err,
            SdkError::Runtime(RuntimeError::DuplicateParameter(_))
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_wrong_default_type() {
        let store = Arc::new(MemoryStore::new());
        let service = service(Arc::clone(&store));
        let mut bad = param("p", Stage::Dev);
        bad.default_value = Value::from("yes");

        let err = service.register(bad).await.unwrap_err();
        assert!(matches!(err, SdkError::Runtime(RuntimeError::Core(_))));
        assert_eq!(store.save_attempts(), 0);
    }

    #[tokio::test]
    async fn test_failed_register_is_not_applied() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_writes(true);
        let service = service(Arc::clone(&store));

        let err = service.register(param("p", Stage::Dev)).await.unwrap_err();
        assert!(matches!(err, SdkError::PersistenceUnavailable(_)));
        assert!(!service.registry.contains("p"));
    }

    #[tokio::test]
    async fn test_late_acknowledged_update_is_rolled_back() {
        let store = Arc::new(MemoryStore::new());
        let service = service(Arc::clone(&store));
        service.register(param("p", Stage::Test)).await.unwrap();

        store.delay_next_ack(Duration::from_millis(500));
        let err = service
            .update_rules("p", "alice", "on", &enable_in_test())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::PersistenceUnavailable(_)));

        let stored = store.stored("p").await.unwrap();
        assert_eq!(stored.revision, 0);
        assert!(stored.rules.is_empty());
        assert_eq!(service.registry.get("p").unwrap().revision, 0);
        assert!(service.audit.records_for("p").await.is_empty());
    }

    #[tokio::test]
    async fn test_late_acknowledged_register_is_discarded() {
        let store = Arc::new(MemoryStore::new());
        let service = service(Arc::clone(&store));

        store.delay_next_ack(Duration::from_millis(500));
        let err = service.register(param("p", Stage::Dev)).await.unwrap_err();

        assert!(matches!(err, SdkError::PersistenceUnavailable(_)));
        assert!(!service.registry.contains("p"));
        assert!(store.stored("p").await.is_none());
    }

    #[tokio::test]
    async fn test_late_acknowledged_promotion_is_rolled_back() {
        let store = Arc::new(MemoryStore::new());
        let service = service(Arc::clone(&store));
        service.register(param("p", Stage::Dev)).await.unwrap();

        store.delay_next_ack(Duration::from_millis(500));
        service
            .promote_stage("p", "alice", "to test", Stage::Test)
            .await
            .unwrap_err();

        assert_eq!(store.stored("p").await.unwrap().stage, Stage::Dev);
        assert_eq!(service.registry.get("p").unwrap().stage, Stage::Dev);
    }

    #[tokio::test]
    async fn test_update_writes_audit() {
        let store = Arc::new(MemoryStore::new());
        let service = service(Arc::clone(&store));
        service.register(param("p", Stage::Test)).await.unwrap();

        let record = service
            .update_rules("p", "alice", "enable in test", &enable_in_test())
            .await
            .unwrap();

        assert_eq!(record.revision, 1);
        assert_eq!(record.committer, "alice");
        assert_eq!(service.audit.records_for("p").await, vec![record.clone()]);
        assert_eq!(store.audit_records().await, vec![record]);
        assert_eq!(store.stored("p").await.unwrap().rules.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_committer_rejected() {
        let service = service(Arc::new(MemoryStore::new()));
        service.register(param("p", Stage::Test)).await.unwrap();

        let err = service
            .update_rules("p", "  ", "msg", &enable_in_test())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_promotion_is_one_step_forward() {
        let service = service(Arc::new(MemoryStore::new()));
        service.register(param("p", Stage::Dev)).await.unwrap();

        let skip = service
            .promote_stage("p", "alice", "skip", Stage::Prod)
            .await
            .unwrap_err();
        assert!(matches!(skip, SdkError::StageTransition { .. }));

        let record = service
            .promote_stage("p", "alice", "to test", Stage::Test)
            .await
            .unwrap();
        assert_eq!(record.stage_change.map(|c| (c.from, c.to)), Some((Stage::Dev, Stage::Test)));

        let back = service
            .promote_stage("p", "alice", "back", Stage::Dev)
            .await
            .unwrap_err();
        assert!(matches!(back, SdkError::StageTransition { .. }));

        let same = service
            .promote_stage("p", "alice", "again", Stage::Test)
            .await
            .unwrap_err();
        assert!(matches!(same, SdkError::StageTransition { .. }));
        assert_eq!(service.registry.get("p").unwrap().stage, Stage::Test);
    }

    #[tokio::test]
    async fn test_without_store() {
        let service = UpdateService::new(
            Arc::new(ParameterRegistry::new()),
            None,
            PersistencePolicy::default(),
            Arc::new(AuditLog::new()),
        );
        service.register(param("p", Stage::Test)).await.unwrap();
        let record = service
            .update_rules("p", "alice", "msg", &enable_in_test())
            .await
            .unwrap();
        assert_eq!(record.revision, 1);
    }
}
