use async_trait::async_trait;

use crate::config::PipelineConfig;
use crate::error::SqlPipelineError;
use crate::executor::StatementExecutor;
use crate::pipeline::PipelineClient;
use crate::query_builder::QueryBuilder;
use crate::results::QueryResult;
use crate::schema::{SchemaReport, TableSchema, ensure_schema};
use crate::types::RowValues;

/// The single entry point collaborators use to talk to the remote engine.
///
/// Holds only the validated endpoint configuration. Every [`execute`](Self::execute) is its
/// own HTTP round trip and its own unit of work on the remote; nothing spans calls.
#[derive(Debug, Clone)]
pub struct PipelineDb {
    client: PipelineClient,
}

impl PipelineDb {
    /// # Errors
    /// Returns `SqlPipelineError::ConfigError` if the HTTP client cannot be built.
    pub fn new(config: PipelineConfig) -> Result<Self, SqlPipelineError> {
        Ok(Self {
            client: PipelineClient::new(config)?,
        })
    }

    /// Build from `TURSO_URL` / `TURSO_TOKEN`.
    ///
    /// # Errors
    /// Returns `SqlPipelineError::ConfigError` for missing or invalid settings.
    pub fn from_env() -> Result<Self, SqlPipelineError> {
        Self::new(PipelineConfig::from_env()?)
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        self.client.config()
    }

    /// Run one statement and return its records, affected count and last inserted id.
    ///
    /// # Errors
    /// See [`PipelineClient::execute`].
    pub async fn execute(
        &self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<QueryResult, SqlPipelineError> {
        self.client.execute(sql, params).await
    }

    /// Start a fluent query.
    #[must_use]
    pub fn query<'db, 'q>(&'db self, sql: &'q str) -> QueryBuilder<'db, 'q> {
        QueryBuilder::new(self, sql)
    }

    /// Create `schema`'s table if needed and add missing columns. Call once at startup,
    /// before other queries.
    ///
    /// # Errors
    /// Fails when the create or introspection statement fails.
    pub async fn ensure_schema(
        &self,
        schema: &TableSchema,
    ) -> Result<SchemaReport, SqlPipelineError> {
        ensure_schema(self, schema).await
    }
}

#[async_trait]
impl StatementExecutor for PipelineDb {
    async fn execute(
        &self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<QueryResult, SqlPipelineError> {
        self.client.execute(sql, params).await
    }
}
