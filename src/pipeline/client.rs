use std::sync::Arc;

use tracing::{debug, warn};

use super::request::{PipelineRequest, Statement};
use super::response::{ExecuteStep, PipelineResponse};
use crate::config::PipelineConfig;
use crate::error::SqlPipelineError;
use crate::results::{QueryResult, materialize};
use crate::types::RowValues;

/// Sends one `[execute, close]` pipeline per call.
///
/// Cloning is cheap and clones share nothing mutable: the configuration is read-only and
/// the HTTP client keeps no idle connections between calls.
#[derive(Debug, Clone)]
pub struct PipelineClient {
    config: Arc<PipelineConfig>,
    http: reqwest::Client,
}

impl PipelineClient {
    /// # Errors
    /// Returns `SqlPipelineError::ConfigError` if the HTTP client cannot be initialised.
    pub fn new(config: PipelineConfig) -> Result<Self, SqlPipelineError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| {
                SqlPipelineError::ConfigError(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one statement in its own HTTP round trip. Never retried.
    ///
    /// # Errors
    /// `ParameterError` before sending; `TransportError` for network failures, deadline
    /// expiry and HTTP status >= 400; `ProtocolError`/`RemoteError` for unexpected bodies.
    pub async fn execute(
        &self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<QueryResult, SqlPipelineError> {
        let request = PipelineRequest::execute_and_close(Statement::new(sql, params)?);
        let body = self.send(sql, &request).await?;

        match PipelineResponse::parse(&body)?.into_execute_step()? {
            ExecuteStep::Executed(payload) => Ok(materialize(&payload)),
            ExecuteStep::Other(kind) => {
                warn!(kind = %kind, sql, "pipeline returned a non-execute response");
                Ok(QueryResult::no_result(kind))
            }
        }
    }

    async fn send(&self, sql: &str, request: &PipelineRequest) -> Result<String, SqlPipelineError> {
        let response = self
            .http
            .post(self.config.endpoint())
            .bearer_auth(self.config.auth_token())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            // The status is known even if the error body cannot be read.
            let text = response.text().await.unwrap_or_default();
            debug!(sql, status = status.as_u16(), "pipeline round trip failed");
            return Err(SqlPipelineError::TransportError {
                status: Some(status.as_u16()),
                message: if text.is_empty() {
                    status.to_string()
                } else {
                    text
                },
            });
        }

        let text = response.text().await?;
        debug!(sql, status = status.as_u16(), bytes = text.len(), "pipeline round trip");
        Ok(text)
    }
}
