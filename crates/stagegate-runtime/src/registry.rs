//! Parameter registry
//!
//! Owns every registered [`Parameter`]. Parameters are published as immutable
//! `Arc<Parameter>` snapshots: a writer builds a complete replacement and swaps
//! the map entry under a short write lock, so a reader holding a snapshot sees
//! either the whole old parameter or the whole new one and never waits on
//! validation or I/O.
//!
//! The registry also keeps a schema version that changes whenever the set of
//! evaluated names changes (registration, removal, deprecation). Status caches
//! use it as their staleness stamp.

use crate::consistency::{self, ConsistencyReport};
use crate::error::{Result, RuntimeError};
use stagegate_core::{CoreError, DataType, ParamName, Parameter, Rule, Stage, StageLists, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Registry of all known parameters
#[derive(Debug, Default)]
pub struct ParameterRegistry {
    parameters: RwLock<HashMap<ParamName, Arc<Parameter>>>,
    schema_version: AtomicU64,
}

impl ParameterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ParamName, Arc<Parameter>>> {
        self.parameters.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ParamName, Arc<Parameter>>> {
        self.parameters.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump_schema(&self) {
        self.schema_version.fetch_add(1, Ordering::AcqRel);
    }

    /// Register a new parameter with no rules
    ///
    /// Fails with `DuplicateParameter` if the name is taken, and with a type
    /// error if the default does not match the data type.
    pub fn register(
        &self,
        name: ParamName,
        description: impl Into<String>,
        stage: Stage,
        default_value: Value,
        data_type: DataType,
    ) -> Result<Arc<Parameter>> {
        self.insert(Parameter::new(name, description, stage, default_value, data_type))
    }

    /// Register a fully built parameter
    pub fn insert(&self, parameter: Parameter) -> Result<Arc<Parameter>> {
        if !parameter.data_type.accepts(&parameter.default_value) {
            return Err(CoreError::TypeError(format!(
                "default value {} of '{}' is not a {}",
                parameter.default_value, parameter.name, parameter.data_type
            ))
            .into());
        }

        let mut parameters = self.write();
        if parameters.contains_key(&parameter.name) {
            return Err(RuntimeError::DuplicateParameter(parameter.name));
        }

        let parameter = Arc::new(parameter);
        parameters.insert(parameter.name.clone(), Arc::clone(&parameter));
        drop(parameters);
        self.bump_schema();

        info!(
            "Registered parameter '{}' at stage {}",
            parameter.name, parameter.stage
        );
        Ok(parameter)
    }

    /// Current snapshot of a parameter
    pub fn get(&self, name: &str) -> Result<Arc<Parameter>> {
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownParameter(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<ParamName> {
        let mut names: Vec<ParamName> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Snapshots of every parameter, sorted by name
    pub fn snapshot(&self) -> Vec<Arc<Parameter>> {
        let mut parameters: Vec<Arc<Parameter>> = self.read().values().cloned().collect();
        parameters.sort_by(|a, b| a.name.cmp(&b.name));
        parameters
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Version of the set of evaluated names
    pub fn schema_version(&self) -> u64 {
        self.schema_version.load(Ordering::Acquire)
    }

    /// Atomically replace a parameter's rule list
    ///
    /// Rules must already be validated.
    pub fn replace_rules(&self, name: &str, rules: Vec<Rule>) -> Result<Arc<Parameter>> {
        let mut parameters = self.write();
        let current = parameters
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownParameter(name.to_string()))?;

        let updated = Arc::new(current.with_rules(rules));
        parameters.insert(updated.name.clone(), Arc::clone(&updated));

        debug!(
            "Replaced rules of '{}' (revision {})",
            updated.name, updated.revision
        );
        Ok(updated)
    }

    /// Publish a new version of an already registered parameter
    ///
    /// Returns the previous snapshot.
    pub fn publish(&self, parameter: Parameter) -> Result<Arc<Parameter>> {
        let mut parameters = self.write();
        let previous = parameters
            .get(&parameter.name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownParameter(parameter.name.to_string()))?;

        let deprecation_changed = previous.is_deprecated() != parameter.is_deprecated();
        parameters.insert(parameter.name.clone(), Arc::new(parameter));
        drop(parameters);

        if deprecation_changed {
            self.bump_schema();
        }
        Ok(previous)
    }

    /// Remove a parameter, returning its last snapshot
    pub fn remove(&self, name: &str) -> Option<Arc<Parameter>> {
        let removed = self.write().remove(name);
        if removed.is_some() {
            self.bump_schema();
            debug!("Removed parameter '{}'", name);
        }
        removed
    }

    /// Compare registered parameters with declared stage lists
    pub fn check_consistency(&self, expected: &StageLists) -> ConsistencyReport {
        consistency::check(&self.snapshot(), expected)
    }

    /// Fail with `Consistency` unless the registry matches the stage lists
    pub fn validate_consistency(&self, expected: &StageLists) -> Result<()> {
        let report = self.check_consistency(expected);
        if report.is_consistent() {
            Ok(())
        } else {
            Err(RuntimeError::Consistency(report))
        }
    }
}
