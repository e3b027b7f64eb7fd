use async_trait::async_trait;

use crate::error::SqlPipelineError;
use crate::pipeline::PipelineClient;
use crate::results::QueryResult;
use crate::types::RowValues;

/// Anything that can run one positional-parameter statement and hand back its result.
///
/// The Schema Guard and the table repositories are written against this trait so they run
/// unchanged over the HTTP client or a test double.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    /// Run `sql` with `params` bound to its `?` placeholders, in order.
    async fn execute(
        &self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<QueryResult, SqlPipelineError>;
}

#[async_trait]
impl StatementExecutor for PipelineClient {
    async fn execute(
        &self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<QueryResult, SqlPipelineError> {
        PipelineClient::execute(self, sql, params).await
    }
}
