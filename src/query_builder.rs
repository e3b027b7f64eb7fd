use std::borrow::Cow;

use crate::error::SqlPipelineError;
use crate::executor::StatementExecutor;
use crate::results::{QueryResult, Record};
use crate::types::RowValues;

/// Fluent builder for a single statement.
///
/// ```rust,no_run
/// # use sql_pipeline::prelude::*;
/// # async fn run(db: &PipelineDb) -> Result<(), SqlPipelineError> {
/// let rows = db
///     .query("SELECT company_name FROM jobs WHERE status = ?")
///     .params(&[RowValues::Text("interview".into())])
///     .select()
///     .await?;
/// # let _ = rows;
/// # Ok(())
/// # }
/// ```
pub struct QueryBuilder<'db, 'q> {
    executor: &'db dyn StatementExecutor,
    sql: &'q str,
    params: Cow<'q, [RowValues]>,
}

impl<'db, 'q> QueryBuilder<'db, 'q> {
    pub(crate) fn new(executor: &'db dyn StatementExecutor, sql: &'q str) -> Self {
        Self {
            executor,
            sql,
            params: Cow::Borrowed(&[]),
        }
    }

    /// Provide parameters for this statement.
    #[must_use]
    pub fn params(mut self, params: &'q [RowValues]) -> Self {
        self.params = Cow::Borrowed(params);
        self
    }

    /// Append one parameter.
    #[must_use]
    pub fn bind(mut self, value: impl Into<RowValues>) -> Self {
        self.params.to_mut().push(value.into());
        self
    }

    /// Execute and return the full result.
    pub async fn execute(self) -> Result<QueryResult, SqlPipelineError> {
        self.executor.execute(self.sql, self.params.as_ref()).await
    }

    /// Execute a SELECT and return its records.
    pub async fn select(self) -> Result<Vec<Record>, SqlPipelineError> {
        Ok(self.execute().await?.records)
    }

    /// Execute a DML statement and return rows affected.
    pub async fn dml(self) -> Result<u64, SqlPipelineError> {
        Ok(self.execute().await?.affected)
    }
}
