//! Append-only audit log
//!
//! Every committed change produces one [`AuditRecord`]. The log keeps them per
//! parameter in commit order; records are never modified or removed.

use stagegate_core::{AuditRecord, ParamName};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory audit log
#[derive(Debug, Default)]
pub struct AuditLog {
    records: RwLock<HashMap<ParamName, Vec<AuditRecord>>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record
    pub async fn append(&self, record: AuditRecord) {
        self.records
            .write()
            .await
            .entry(record.parameter.clone())
            .or_default()
            .push(record);
    }

    /// Seed a parameter's history, e.g. from the store at startup
    pub async fn extend(&self, name: &ParamName, records: Vec<AuditRecord>) {
        if records.is_empty() {
            return;
        }
        self.records
            .write()
            .await
            .entry(name.clone())
            .or_default()
            .extend(records);
    }

    /// A parameter's records in commit order
    pub async fn records_for(&self, name: &str) -> Vec<AuditRecord> {
        self.records
            .read()
            .await
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of records
    pub async fn len(&self) -> usize {
        self.records.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
