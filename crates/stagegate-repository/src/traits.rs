//! Persistence contract
//!
//! The engine keeps all live state in memory and treats the store as the
//! durable copy: definitions are loaded once at startup, every committed change
//! is saved before it is published, and audit records are appended after.

use async_trait::async_trait;
use stagegate_core::{AuditRecord, ParamName, Parameter, ParameterDefinition};

use crate::RepositoryResult;

/// Durable store for parameters and their audit trail
///
/// Saving a parameter is atomic per parameter: after a failed save the store
/// holds either the previous definition or the new one, never a mix. A save
/// that was cancelled by a timeout may still land; the engine writes the
/// previous state back in that case.
///
/// All implementations must be `Send + Sync` for use across async tasks.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Load every stored parameter definition
    ///
    /// Rules come back unvalidated; the caller validates them before use.
    async fn load_all_parameters(&self) -> RepositoryResult<Vec<ParameterDefinition>>;

    /// Store the full current state of one parameter, replacing any previous one
    async fn save_parameter(&self, parameter: &Parameter) -> RepositoryResult<()>;

    /// Delete a stored parameter; deleting a missing one succeeds
    async fn remove_parameter(&self, name: &ParamName) -> RepositoryResult<()>;

    /// Append one audit record
    async fn append_audit(&self, record: &AuditRecord) -> RepositoryResult<()>;

    /// Audit records of one parameter in commit order
    async fn load_audit(&self, name: &ParamName) -> RepositoryResult<Vec<AuditRecord>>;
}
