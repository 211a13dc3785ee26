//! PostgreSQL parameter store
//!
//! Definitions are kept as YAML text, one row per parameter; audit records are
//! kept as JSON text in insertion order.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;
use stagegate_core::{AuditRecord, ParamName, Parameter, ParameterDefinition};
use stagegate_parser::ParameterParser;
use tracing::info;

use crate::{error::RepositoryError, traits::ParameterStore, RepositoryResult};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS parameters (
        name TEXT PRIMARY KEY,
        content TEXT NOT NULL,
        revision BIGINT NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS audit_records (
        seq BIGSERIAL PRIMARY KEY,
        id TEXT NOT NULL UNIQUE,
        parameter TEXT NOT NULL,
        revision BIGINT NOT NULL,
        record TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS audit_records_parameter ON audit_records (parameter, seq)",
];

/// PostgreSQL parameter store
#[derive(Debug, Clone)]
pub struct PostgresStore {
    /// Database connection pool
    pool: PgPool,
}

impl PostgresStore {
    /// Connect and make sure the tables exist
    pub async fn new(database_url: &str) -> RepositoryResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        let store = Self::with_pool(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create a store with an existing pool
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the tables if they are missing
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("PostgreSQL parameter store schema ready");
        Ok(())
    }
}

#[async_trait]
impl ParameterStore for PostgresStore {
    async fn load_all_parameters(&self) -> RepositoryResult<Vec<ParameterDefinition>> {
        let rows = sqlx::query("SELECT name, content FROM parameters ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> RepositoryResult<ParameterDefinition> {
                let name: String = row.try_get("name")?;
                let content: String = row.try_get("content")?;
                ParameterParser::parse(&content)
                    .map_err(|e| RepositoryError::Parser(format!("{}: {}", name, e)))
            })
            .collect()
    }

    async fn save_parameter(&self, parameter: &Parameter) -> RepositoryResult<()> {
        let content = serde_yaml::to_string(&ParameterDefinition::from(parameter))?;

        sqlx::query(
            r#"
            INSERT INTO parameters (name, content, revision, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (name) DO UPDATE
            SET content = $2, revision = $3, updated_at = NOW()
            "#,
        )
        .bind(parameter.name.as_str())
        .bind(&content)
        .bind(parameter.revision as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_parameter(&self, name: &ParamName) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM parameters WHERE name = $1")
            .bind(name.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn append_audit(&self, record: &AuditRecord) -> RepositoryResult<()> {
        let json = serde_json::to_string(record)?;

        sqlx::query(
            r#"
            INSERT INTO audit_records (id, parameter, revision, record)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.parameter.as_str())
        .bind(record.revision as i64)
        .bind(&json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn load_audit(&self, name: &ParamName) -> RepositoryResult<Vec<AuditRecord>> {
        let rows = sqlx::query("SELECT record FROM audit_records WHERE parameter = $1 ORDER BY seq")
            .bind(name.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> RepositoryResult<AuditRecord> {
                let json: String = row.try_get("record")?;
                Ok(serde_json::from_str(&json)?)
            })
            .collect()
    }
}
