//! Builder pattern for FeatureGate

use crate::audit::AuditLog;
use crate::config::{EngineConfig, PersistencePolicy};
use crate::error::{Result, SdkError};
use crate::gate::FeatureGate;
use crate::update::UpdateService;
use stagegate_core::{Environment, Parameter, ParameterDefinition, StageLists};
use stagegate_parser::{ParameterParser, StageListParser};
use stagegate_repository::{
    FileSystemStore, MemoryStore, ParameterStore, RepositoryConfig, RepositorySource,
};
use stagegate_runtime::{validate_rules, ParameterRegistry, RuntimeError, StatusCache, StatusCacheConfig};
use std::sync::Arc;
use tracing::{info, warn};

/// Builder for FeatureGate
///
/// # Example
///
/// ```rust,ignore
/// use stagegate_sdk::{Environment, FeatureGateBuilder, RepositoryConfig};
///
/// // From a file system store
/// let gate = FeatureGateBuilder::new()
///     .with_environment(Environment::Prod)
///     .with_repository(RepositoryConfig::file_system("data"))
///     .build()
///     .await?;
///
/// // Inline definitions, nothing persisted (for testing)
/// let gate = FeatureGateBuilder::new()
///     .add_definition_content(yaml_content)
///     .build()
///     .await?;
/// ```
#[derive(Default)]
pub struct FeatureGateBuilder {
    config: EngineConfig,
    store: Option<Arc<dyn ParameterStore>>,
    definitions: Vec<ParameterDefinition>,
    definition_contents: Vec<String>,
    stage_lists: Option<StageLists>,
    stage_list_content: Option<String>,
    strict_consistency: bool,
}

impl FeatureGateBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the process environment
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.config.environment = environment;
        self
    }

    // ========== Persistence ==========

    /// Load from and persist to the configured repository
    pub fn with_repository(mut self, config: RepositoryConfig) -> Self {
        self.config.repository = Some(config);
        self
    }

    /// Use an already constructed store; takes precedence over `with_repository`
    pub fn with_store(mut self, store: Arc<dyn ParameterStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_persistence(mut self, policy: PersistencePolicy) -> Self {
        self.config.persistence = policy;
        self
    }

    pub fn with_status_cache(mut self, config: StatusCacheConfig) -> Self {
        self.config.status_cache = config;
        self
    }

    // ========== Inline Content ==========

    /// Register a definition at build time without persisting it
    pub fn add_definition(mut self, definition: ParameterDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Register every definition in a YAML document at build time
    pub fn add_definition_content(mut self, content: impl Into<String>) -> Self {
        self.definition_contents.push(content.into());
        self
    }

    // ========== Consistency ==========

    /// Stage lists the registry is checked against after loading
    pub fn with_stage_lists(mut self, lists: StageLists) -> Self {
        self.stage_lists = Some(lists);
        self
    }

    /// Stage lists as a YAML `stages:` document
    pub fn with_stage_list_content(mut self, content: impl Into<String>) -> Self {
        self.stage_list_content = Some(content.into());
        self
    }

    /// Fail the build instead of logging when the stage lists disagree
    pub fn strict_consistency(mut self, strict: bool) -> Self {
        self.strict_consistency = strict;
        self
    }

    /// Build the feature gate
    ///
    /// Loads every stored definition, then the inline ones. A definition whose
    /// rules fail validation is registered with no rules, so it evaluates to
    /// its default until fixed.
    pub async fn build(self) -> Result<FeatureGate> {
        let store = match self.store {
            Some(store) => Some(store),
            None => match &self.config.repository {
                Some(config) => Some(open_store(config).await?),
                None => None,
            },
        };

        let policy = self.config.persistence;
        let mut definitions = Vec::new();
        if let Some(store) = &store {
            let stored = policy
                .run("load parameters", || store.load_all_parameters())
                .await?;
            definitions.extend(stored);
        }
        definitions.extend(self.definitions);
        for content in &self.definition_contents {
            definitions.extend(ParameterParser::parse_all(content)?);
        }

        let registry = Arc::new(ParameterRegistry::new());
        for definition in definitions {
            registry.insert(to_parameter(definition))?;
        }
        info!(
            "Loaded {} parameter(s) for environment {}",
            registry.len(),
            self.config.environment
        );

        let audit = Arc::new(AuditLog::new());
        if let Some(store) = &store {
            for name in registry.names() {
                let operation = format!("load audit for '{}'", name);
                match policy.run(&operation, || store.load_audit(&name)).await {
                    Ok(records) => audit.extend(&name, records).await,
                    Err(e) => warn!("Could not load audit trail of '{}': {}", name, e),
                }
            }
        }

        let stage_lists = match (self.stage_lists, &self.stage_list_content) {
            (Some(lists), _) => Some(lists),
            (None, Some(content)) => Some(StageListParser::parse(content)?),
            (None, None) => None,
        };
        if let Some(lists) = &stage_lists {
            let report = registry.check_consistency(lists);
            if !report.is_consistent() {
                if self.strict_consistency {
                    return Err(RuntimeError::Consistency(report).into());
                }
                for discrepancy in &report.discrepancies {
                    warn!("Stage list discrepancy: {}", discrepancy);
                }
            }
        }

        let updates = UpdateService::new(
            Arc::clone(&registry),
            store,
            policy,
            Arc::clone(&audit),
        );

        Ok(FeatureGate {
            cache: StatusCache::new(self.config.status_cache.clone()),
            config: self.config,
            registry,
            updates,
            audit,
        })
    }
}

/// Open the store a repository configuration points at
pub async fn open_store(config: &RepositoryConfig) -> Result<Arc<dyn ParameterStore>> {
    config.validate()?;
    match config.source {
        RepositorySource::FileSystem => {
            let path = config.base_path.as_deref().unwrap_or_default();
            Ok(Arc::new(FileSystemStore::create(path).await?))
        }
        RepositorySource::Memory => Ok(Arc::new(MemoryStore::new())),
        #[cfg(feature = "postgres")]
        RepositorySource::Database => {
            let url = config.database_url.as_deref().unwrap_or_default();
            Ok(Arc::new(stagegate_repository::PostgresStore::new(url).await?))
        }
        #[cfg(not(feature = "postgres"))]
        RepositorySource::Database => Err(SdkError::ConfigError(
            "database repository requires the `postgres` feature".to_string(),
        )),
    }
}

/// Turn a stored definition into a parameter, dropping rules that no longer validate
fn to_parameter(definition: ParameterDefinition) -> Parameter {
    let rules = match validate_rules(&definition.rules, definition.data_type) {
        Ok(rules) => rules,
        Err(e) => {
            warn!(
                "Rules of '{}' are invalid and were dropped, it evaluates to its default: {}",
                definition.name, e
            );
            Vec::new()
        }
    };

    let mut parameter = Parameter::new(
        definition.name,
        definition.description,
        definition.stage,
        definition.default_value,
        definition.data_type,
    );
    parameter.rules = rules;
    parameter.revision = definition.revision;
    parameter
}
