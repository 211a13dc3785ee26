//! Consistency between registered parameters and declared stage lists
//!
//! Every registered name must appear in exactly one stage list, every listed
//! name must be registered, and a registered parameter should sit in the list
//! of its current stage.

use serde::Serialize;
use stagegate_core::{ParamName, Parameter, Stage, StageLists};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// One disagreement between the registry and the stage lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discrepancy {
    /// Registered but absent from every stage list
    Undeclared { name: ParamName },
    /// Listed but not registered
    Unregistered { name: ParamName, stage: Stage },
    /// Listed more than once
    DeclaredMultiple { name: ParamName, stages: Vec<Stage> },
    /// Listed under a stage other than the registered one
    StageMismatch {
        name: ParamName,
        declared: Stage,
        registered: Stage,
    },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::Undeclared { name } => {
                write!(f, "'{}' is registered but not declared in any stage list", name)
            }
            Discrepancy::Unregistered { name, stage } => {
                write!(f, "'{}' is declared in {} but not registered", name, stage)
            }
            Discrepancy::DeclaredMultiple { name, stages } => {
                let stages: Vec<&str> = stages.iter().map(|s| s.as_str()).collect();
                write!(f, "'{}' is declared more than once ({})", name, stages.join(", "))
            }
            Discrepancy::StageMismatch {
                name,
                declared,
                registered,
            } => write!(
                f,
                "'{}' is declared in {} but registered at stage {}",
                name, declared, registered
            ),
        }
    }
}

/// Result of a consistency check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    pub discrepancies: Vec<Discrepancy>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

impl fmt::Display for ConsistencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.discrepancies.is_empty() {
            return f.write_str("consistent");
        }
        for (i, d) in self.discrepancies.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

/// Compare registered parameters with declared stage lists
///
/// Discrepancies are reported in name order.
pub fn check(parameters: &[Arc<Parameter>], expected: &StageLists) -> ConsistencyReport {
    let mut declared: BTreeMap<&ParamName, Vec<Stage>> = BTreeMap::new();
    for (stage, name) in expected.iter() {
        declared.entry(name).or_default().push(stage);
    }

    let registered: BTreeMap<&ParamName, Stage> =
        parameters.iter().map(|p| (&p.name, p.stage)).collect();

    let mut discrepancies = Vec::new();

    for (name, stages) in &declared {
        if stages.len() > 1 {
            discrepancies.push(Discrepancy::DeclaredMultiple {
                name: (*name).clone(),
                stages: stages.clone(),
            });
        }
        match registered.get(name) {
            None => discrepancies.push(Discrepancy::Unregistered {
                name: (*name).clone(),
                stage: stages[0],
            }),
            Some(&stage) if stages.len() == 1 && stages[0] != stage => {
                discrepancies.push(Discrepancy::StageMismatch {
                    name: (*name).clone(),
                    declared: stages[0],
                    registered: stage,
                })
            }
            Some(_) => {}
        }
    }

    for name in registered.keys() {
        if !declared.contains_key(name) {
            discrepancies.push(Discrepancy::Undeclared {
                name: (*name).clone(),
            });
        }
    }

    ConsistencyReport { discrepancies }
}
