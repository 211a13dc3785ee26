//! Stage gate
//!
//! Fixed mapping from a parameter's lifecycle stage to the environments it may
//! take effect in:
//!
//! | stage      | environments        |
//! |------------|---------------------|
//! | dev        | dev                 |
//! | test       | dev, test           |
//! | prod       | dev, test, prod     |
//! | deprecated | none                |

use stagegate_core::{Environment, Stage};

/// Stage-to-environment gate
pub struct StageGate;

impl StageGate {
    /// Environments a parameter at `stage` may take effect in
    pub fn allowed_environments(stage: Stage) -> &'static [Environment] {
        match stage {
            Stage::Dev => &[Environment::Dev],
            Stage::Test => &[Environment::Dev, Environment::Test],
            Stage::Prod => &[Environment::Dev, Environment::Test, Environment::Prod],
            Stage::Deprecated => &[],
        }
    }

    /// Returns true if a parameter at `stage` may take effect in `environment`
    pub fn is_allowed(stage: Stage, environment: Environment) -> bool {
        Self::allowed_environments(stage).contains(&environment)
    }
}
