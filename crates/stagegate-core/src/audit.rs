//! Audit records
//!
//! One record is produced for every committed change. Records are immutable
//! and only ever appended.

use crate::ast::{Parameter, Rule, Stage};
use crate::types::ParamName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stage transition carried by a promotion record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageChange {
    pub from: Stage,
    pub to: Stage,
}

/// Committed change to a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub parameter: ParamName,
    /// Parameter revision produced by this commit
    pub revision: u64,
    pub committer: String,
    pub message: String,
    pub committed_at: DateTime<Utc>,
    /// Rule list in effect after the commit
    pub rules: Vec<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_change: Option<StageChange>,
}

impl AuditRecord {
    /// Record for a committed rule replacement
    pub fn rules_updated(
        parameter: &Parameter,
        committer: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            parameter: parameter.name.clone(),
            revision: parameter.revision,
            committer: committer.into(),
            message: message.into(),
            committed_at: parameter.updated_at,
            rules: parameter.rules.clone(),
            stage_change: None,
        }
    }

    /// Record for a committed stage promotion
    pub fn stage_promoted(
        parameter: &Parameter,
        from: Stage,
        committer: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            stage_change: Some(StageChange {
                from,
                to: parameter.stage,
            }),
            ..Self::rules_updated(parameter, committer, message)
        }
    }
}
