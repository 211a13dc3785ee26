//! Status cache
//!
//! Per-session cache of the full feature status mapping handed to clients.
//! The first request in a session evaluates every non-deprecated parameter and
//! stores the result stamped with the registry's schema version. Later requests
//! in the same session reuse it until the stamp goes stale (the set of names
//! changed), the entry expires, or the session is invalidated.

use crate::context::EvaluationContext;
use crate::engine::evaluate;
use crate::registry::ParameterRegistry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stagegate_core::{Environment, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Client-facing status of one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureStatus {
    /// Boolean parameter
    Flag {
        #[serde(rename = "isEnabled")]
        is_enabled: bool,
    },
    /// Any other payload
    Value { value: Value },
}

impl From<Value> for FeatureStatus {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(is_enabled) => FeatureStatus::Flag { is_enabled },
            value => FeatureStatus::Value { value },
        }
    }
}

/// Resolved value of every evaluated feature, with a version stamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSummary {
    /// Registry schema version the summary was built against
    pub version: u64,
    pub generated_at: DateTime<Utc>,
    pub environment: Environment,
    pub features: BTreeMap<String, FeatureStatus>,
}

impl StatusSummary {
    /// Evaluate every non-deprecated parameter in the registry
    pub fn build(registry: &ParameterRegistry, context: &EvaluationContext) -> Self {
        // read the stamp first so a concurrent registration makes the summary stale
        let version = registry.schema_version();
        let features = registry
            .snapshot()
            .iter()
            .filter(|p| !p.is_deprecated())
            .map(|p| (p.name.to_string(), FeatureStatus::from(evaluate(p, context).value)))
            .collect();

        Self {
            version,
            generated_at: Utc::now(),
            environment: context.environment,
            features,
        }
    }

    pub fn get(&self, name: &str) -> Option<&FeatureStatus> {
        self.features.get(name)
    }
}

/// Status cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCacheConfig {
    /// Whether summaries are cached at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum age of a cached summary; `None` keeps it for the whole session
    #[serde(default, with = "optional_secs")]
    pub ttl: Option<Duration>,

    /// Maximum number of sessions kept; the oldest entry is evicted first
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_max_sessions() -> usize {
    10_000
}

impl Default for StatusCacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            ttl: None,
            max_sessions: default_max_sessions(),
        }
    }
}

impl StatusCacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

mod optional_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.as_secs()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
    }
}

/// Cache hit/miss statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stale: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate as a fraction in `0.0..=1.0`
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    summary: Arc<StatusSummary>,
    created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        ttl.map_or(false, |ttl| self.created_at.elapsed() >= ttl)
    }
}

/// Per-session status summary cache
#[derive(Debug, Clone)]
pub struct StatusCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    config: StatusCacheConfig,
    stats: Arc<RwLock<CacheStats>>,
}

impl Default for StatusCache {
    fn default() -> Self {
        Self::new(StatusCacheConfig::default())
    }
}

impl StatusCache {
    pub fn new(config: StatusCacheConfig) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            config,
            stats: Arc::new(RwLock::new(CacheStats::default())),
        }
    }

    pub fn config(&self) -> &StatusCacheConfig {
        &self.config
    }

    /// Status summary for a session, evaluating on first use or when stale
    pub async fn get_status_summary(
        &self,
        session_id: &str,
        registry: &ParameterRegistry,
        context: &EvaluationContext,
    ) -> Arc<StatusSummary> {
        if !self.config.enabled {
            return Arc::new(StatusSummary::build(registry, context));
        }

        let current_version = registry.schema_version();
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(session_id) {
                let fresh = entry.summary.version == current_version
                    && entry.summary.environment == context.environment
                    && !entry.is_expired(self.config.ttl);
                if fresh {
                    self.stats.write().await.hits += 1;
                    return Arc::clone(&entry.summary);
                }
                self.stats.write().await.stale += 1;
            }
        }

        self.stats.write().await.misses += 1;
        let summary = Arc::new(StatusSummary::build(registry, context));
        debug!(
            "Built status summary for session '{}' ({} features, version {})",
            session_id,
            summary.features.len(),
            summary.version
        );

        let mut entries = self.entries.write().await;
        if !entries.contains_key(session_id) && entries.len() >= self.config.max_sessions {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                self.stats.write().await.evictions += 1;
            }
        }
        if self.config.max_sessions > 0 {
            entries.insert(
                session_id.to_string(),
                CacheEntry {
                    summary: Arc::clone(&summary),
                    created_at: Instant::now(),
                },
            );
        }

        summary
    }

    /// Drop a session's cached summary
    pub async fn invalidate(&self, session_id: &str) -> bool {
        self.entries.write().await.remove(session_id).is_some()
    }

    /// Drop every cached summary
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        info!("Status cache cleared");
    }

    /// Number of cached sessions
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagegate_core::{DataType, ParamName, Stage};

    fn registry() -> ParameterRegistry {
        let registry = ParameterRegistry::new();
        registry
            .register(ParamName::new("flag").unwrap(), "", Stage::Prod, Value::Bool(true), DataType::Bool)
            .unwrap();
        registry
            .register(ParamName::new("color").unwrap(), "", Stage::Prod, Value::from("blue"), DataType::String)
            .unwrap();
        registry
            .register(ParamName::new("old").unwrap(), "", Stage::Deprecated, Value::Bool(true), DataType::Bool)
            .unwrap();
        registry
    }

    #[test]
    fn test_summary_shape() {
        let summary = StatusSummary::build(&registry(), &EvaluationContext::new(Environment::Prod));
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["features"]["flag"], serde_json::json!({"isEnabled": true}));
        assert_eq!(json["features"]["color"], serde_json::json!({"value": "blue"}));
        assert!(json["features"].get("old").is_none());
        assert_eq!(json["environment"], "prod");
    }

    #[tokio::test]
    async fn test_second_read_is_cached() {
        let registry = registry();
        let cache = StatusCache::default();
        let ctx = EvaluationContext::new(Environment::Prod);

        let first = cache.get_status_summary("s1", &registry, &ctx).await;
        let second = cache.get_status_summary("s1", &registry, &ctx).await;
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats().await;
        assert_eq!((stats.hits, stats.misses), (1, 1));
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[tokio::test]
    async fn test_rule_change_does_not_invalidate() {
        let registry = registry();
        let cache = StatusCache::default();
        let ctx = EvaluationContext::new(Environment::Prod);

        let first = cache.get_status_summary("s1", &registry, &ctx).await;
        registry.replace_rules("flag", Vec::new()).unwrap();
        let second = cache.get_status_summary("s1", &registry, &ctx).await;
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_new_name_makes_entry_stale() {
        let registry = registry();
        let cache = StatusCache::default();
        let ctx = EvaluationContext::new(Environment::Prod);

        let first = cache.get_status_summary("s1", &registry, &ctx).await;
        registry
            .register(ParamName::new("fresh").unwrap(), "", Stage::Prod, Value::Bool(false), DataType::Bool)
            .unwrap();
        let second = cache.get_status_summary("s1", &registry, &ctx).await;

        assert!(second.version > first.version);
        assert!(second.get("fresh").is_some());
        assert_eq!(cache.stats().await.stale, 1);
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let registry = registry();
        let cache = StatusCache::new(StatusCacheConfig::default().with_ttl(Duration::ZERO));
        let ctx = EvaluationContext::new(Environment::Prod);

        let first = cache.get_status_summary("s1", &registry, &ctx).await;
        let second = cache.get_status_summary("s1", &registry, &ctx).await;
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_eviction_and_invalidate() {
        let registry = registry();
        let cache = StatusCache::new(StatusCacheConfig::default().with_max_sessions(2));
        let ctx = EvaluationContext::new(Environment::Prod);

        for session in ["a", "b", "c"] {
            cache.get_status_summary(session, &registry, &ctx).await;
        }
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.stats().await.evictions, 1);

        assert!(cache.invalidate("c").await);
        assert!(!cache.invalidate("c").await);
        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_disabled_cache_keeps_nothing() {
        let registry = registry();
        let cache = StatusCache::new(StatusCacheConfig::disabled());
        let ctx = EvaluationContext::new(Environment::Prod);

        cache.get_status_summary("s1", &registry, &ctx).await;
        assert!(cache.is_empty().await);
    }
}
