//! Stages, environments and declared stage lists

use crate::error::{CoreError, Result};
use crate::types::ParamName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maturity stage of a parameter
///
/// Ordered `Dev < Test < Prod < Deprecated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Dev,
    Test,
    Prod,
    Deprecated,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Dev, Stage::Test, Stage::Prod, Stage::Deprecated];

    /// The stage directly after this one, if any
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Dev => Some(Stage::Test),
            Stage::Test => Some(Stage::Prod),
            Stage::Prod => Some(Stage::Deprecated),
            Stage::Deprecated => None,
        }
    }

    pub fn is_deprecated(&self) -> bool {
        matches!(self, Stage::Deprecated)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Dev => "dev",
            Stage::Test => "test",
            Stage::Prod => "prod",
            Stage::Deprecated => "deprecated",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Stage::Dev),
            "test" => Ok(Stage::Test),
            "prod" => Ok(Stage::Prod),
            "deprecated" => Ok(Stage::Deprecated),
            _ => Err(CoreError::UnknownStage(s.to_string())),
        }
    }
}

/// Deployment environment a process runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Test,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Environment::Dev, Environment::Test, Environment::Prod];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Test => "test",
            Environment::Prod => "prod",
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Dev
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "test" => Ok(Environment::Test),
            "prod" => Ok(Environment::Prod),
            _ => Err(CoreError::UnknownEnvironment(s.to_string())),
        }
    }
}

/// Declared per-stage name lists, checked against the registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageLists {
    #[serde(default)]
    pub dev: Vec<ParamName>,
    #[serde(default)]
    pub test: Vec<ParamName>,
    #[serde(default)]
    pub prod: Vec<ParamName>,
    #[serde(default)]
    pub deprecated: Vec<ParamName>,
}

impl StageLists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declared names for one stage
    pub fn list(&self, stage: Stage) -> &[ParamName] {
        match stage {
            Stage::Dev => &self.dev,
            Stage::Test => &self.test,
            Stage::Prod => &self.prod,
            Stage::Deprecated => &self.deprecated,
        }
    }

    /// Declare a name under a stage
    pub fn with(mut self, stage: Stage, name: ParamName) -> Self {
        self.list_mut(stage).push(name);
        self
    }

    fn list_mut(&mut self, stage: Stage) -> &mut Vec<ParamName> {
        match stage {
            Stage::Dev => &mut self.dev,
            Stage::Test => &mut self.test,
            Stage::Prod => &mut self.prod,
            Stage::Deprecated => &mut self.deprecated,
        }
    }

    /// All declarations in stage order
    pub fn iter(&self) -> impl Iterator<Item = (Stage, &ParamName)> {
        Stage::ALL
            .into_iter()
            .flat_map(move |stage| self.list(stage).iter().map(move |name| (stage, name)))
    }

    pub fn len(&self) -> usize {
        Stage::ALL.iter().map(|s| self.list(*s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_ordering_and_next() {
        assert!(Stage::Dev < Stage::Test);
        assert!(Stage::Prod < Stage::Deprecated);
        assert_eq!(Stage::Dev.next(), Some(Stage::Test));
        assert_eq!(Stage::Prod.next(), Some(Stage::Deprecated));
        assert_eq!(Stage::Deprecated.next(), None);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("DEV".parse::<Stage>().unwrap(), Stage::Dev);
        assert_eq!("Prod".parse::<Environment>().unwrap(), Environment::Prod);
        assert!(matches!(
            "staging".parse::<Environment>(),
            Err(CoreError::UnknownEnvironment(_))
        ));
        assert!("deprecated".parse::<Environment>().is_err());
    }

    #[test]
    fn test_stage_lists_iter() {
        let a = ParamName::new("a").unwrap();
        let b = ParamName::new("b").unwrap();
        let lists = StageLists::new()
            .with(Stage::Prod, b.clone())
            .with(Stage::Dev, a.clone());

        let declared: Vec<_> = lists.iter().collect();
        assert_eq!(declared, vec![(Stage::Dev, &a), (Stage::Prod, &b)]);
        assert_eq!(lists.len(), 2);
        assert!(!lists.is_empty());
    }
}
