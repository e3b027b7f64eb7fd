use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::SqlPipelineError;

/// Response body of one HTTP exchange: one entry per pipeline step.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineResponse {
    pub results: Vec<StreamResult>,
}

/// Outcome of one pipeline step: `{"type":"ok","response":{..}}` or
/// `{"type":"error","error":{..}}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StreamResult {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub response: Option<StreamResponse>,
    pub error: Option<StreamError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StreamResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub result: JsonValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StreamError {
    pub message: String,
    pub code: Option<String>,
}

/// What the first (execute) step produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteStep {
    /// Result payload to materialize.
    Executed(JsonValue),
    /// The remote answered with another response kind.
    Other(String),
}

impl PipelineResponse {
    /// Parse a response body.
    ///
    /// # Errors
    /// Returns `SqlPipelineError::ProtocolError` when the body is not a pipeline envelope.
    pub fn parse(body: &str) -> Result<Self, SqlPipelineError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Extract the execute step's outcome; later steps (the close) are ignored.
    ///
    /// # Errors
    /// `RemoteError` when the step failed on the remote, `ProtocolError` when it carries
    /// neither a response nor an error.
    pub fn into_execute_step(self) -> Result<ExecuteStep, SqlPipelineError> {
        let first = self.results.into_iter().next().ok_or_else(|| {
            SqlPipelineError::ProtocolError("response has no results".to_string())
        })?;

        match (first.response, first.error) {
            (Some(response), _) if response.kind == "execute" => {
                Ok(ExecuteStep::Executed(response.result))
            }
            (Some(response), _) => Ok(ExecuteStep::Other(response.kind)),
            (None, Some(error)) => Err(SqlPipelineError::RemoteError {
                code: error.code,
                message: error.message,
            }),
            (None, None) => Err(SqlPipelineError::ProtocolError(format!(
                "first result has no response envelope (type {:?})",
                first.kind.unwrap_or_default()
            ))),
        }
    }
}
