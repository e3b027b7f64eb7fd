use serde::Serialize;

use crate::codec::{TypedValue, encode_params};
use crate::error::SqlPipelineError;
use crate::types::RowValues;

/// SQL text plus its positional arguments, already in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    sql: String,
    /// Omitted entirely when empty; the remote treats a missing list differently from `[]`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    args: Vec<TypedValue>,
}

impl Statement {
    /// Encode `params` and pair them with `sql`.
    ///
    /// The placeholder count is not checked here; a mismatch comes back as a remote error.
    ///
    /// # Errors
    /// Returns `SqlPipelineError::ParameterError` for blank SQL or an unencodable parameter.
    pub fn new(sql: &str, params: &[RowValues]) -> Result<Self, SqlPipelineError> {
        if sql.trim().is_empty() {
            return Err(SqlPipelineError::ParameterError(
                "SQL statement must not be empty".to_string(),
            ));
        }
        Ok(Self {
            sql: sql.to_string(),
            args: encode_params(params)?,
        })
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn args(&self) -> &[TypedValue] {
        &self.args
    }
}

/// One step of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamRequest {
    Execute { stmt: Statement },
    Close,
}

/// Request body for one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineRequest {
    requests: Vec<StreamRequest>,
}

impl PipelineRequest {
    /// `[execute(stmt), close]`: run one statement, then release the server-side stream.
    #[must_use]
    pub fn execute_and_close(stmt: Statement) -> Self {
        Self {
            requests: vec![StreamRequest::Execute { stmt }, StreamRequest::Close],
        }
    }

    #[must_use]
    pub fn requests(&self) -> &[StreamRequest] {
        &self.requests
    }
}
