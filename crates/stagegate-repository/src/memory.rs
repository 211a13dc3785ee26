//! In-memory parameter store
//!
//! Keeps definitions and audit records in process memory. Useful for tests and
//! embedded setups with no durable storage. Failures and latency can be
//! injected to exercise the engine's persistence error handling, including a
//! write that lands but is acknowledged late.

use async_trait::async_trait;
use stagegate_core::{AuditRecord, ParamName, Parameter, ParameterDefinition};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::{error::RepositoryError, traits::ParameterStore, RepositoryResult};

/// In-memory parameter store
#[derive(Debug, Default)]
pub struct MemoryStore {
    parameters: RwLock<BTreeMap<ParamName, ParameterDefinition>>,
    audit: RwLock<Vec<AuditRecord>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    write_delay_ms: AtomicU64,
    ack_delay_ms: AtomicU64,
    save_attempts: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with definitions
    pub fn with_definitions(definitions: impl IntoIterator<Item = ParameterDefinition>) -> Self {
        let parameters = definitions
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();
        Self {
            parameters: RwLock::new(parameters),
            ..Self::default()
        }
    }

    /// Make every subsequent write fail with `Unavailable`
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Delay every subsequent write
    pub fn set_write_delay(&self, delay: Duration) {
        self.write_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Make every subsequent load fail with `Unavailable`
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Delay the acknowledgement of the next save until after it has been stored
    pub fn delay_next_ack(&self, delay: Duration) {
        self.ack_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of `save_parameter` calls, including failed ones
    pub fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }

    /// Stored definition of one parameter
    pub async fn stored(&self, name: &str) -> Option<ParameterDefinition> {
        self.parameters.read().await.get(name).cloned()
    }

    /// Every stored audit record in append order
    pub async fn audit_records(&self) -> Vec<AuditRecord> {
        self.audit.read().await.clone()
    }

    async fn before_write(&self) -> RepositoryResult<()> {
        let delay = self.write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "memory store is rejecting writes".to_string(),
            ));
        }
        Ok(())
    }

    fn check_read(&self) -> RepositoryResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "memory store is rejecting reads".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ParameterStore for MemoryStore {
    async fn load_all_parameters(&self) -> RepositoryResult<Vec<ParameterDefinition>> {
        self.check_read()?;
        Ok(self.parameters.read().await.values().cloned().collect())
    }

    async fn save_parameter(&self, parameter: &Parameter) -> RepositoryResult<()> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        self.before_write().await?;
        self.parameters
            .write()
            .await
            .insert(parameter.name.clone(), ParameterDefinition::from(parameter));

        let ack_delay = self.ack_delay_ms.swap(0, Ordering::SeqCst);
        if ack_delay > 0 {
            tokio::time::sleep(Duration::from_millis(ack_delay)).await;
        }
        Ok(())
    }

    async fn remove_parameter(&self, name: &ParamName) -> RepositoryResult<()> {
        self.before_write().await?;
        self.parameters.write().await.remove(name);
        Ok(())
    }

    async fn append_audit(&self, record: &AuditRecord) -> RepositoryResult<()> {
        self.before_write().await?;
        self.audit.write().await.push(record.clone());
        Ok(())
    }

    async fn load_audit(&self, name: &ParamName) -> RepositoryResult<Vec<AuditRecord>> {
        self.check_read()?;
        Ok(self
            .audit
            .read()
            .await
            .iter()
            .filter(|r| &r.parameter == name)
            .cloned()
            .collect())
    }
}
