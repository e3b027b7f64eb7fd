use std::time::Duration;

use crate::error::SqlPipelineError;

/// Fixed path segment every pipeline endpoint ends with.
pub const PIPELINE_PATH: &str = "/v2/pipeline";

pub const ENV_URL: &str = "TURSO_URL";
pub const ENV_TOKEN: &str = "TURSO_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "TURSO_TIMEOUT_SECS";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Validated, read-only endpoint configuration.
#[derive(Clone)]
pub struct PipelineConfig {
    endpoint: String,
    auth_token: String,
    timeout: Duration,
}

impl PipelineConfig {
    /// Validate and normalize an endpoint/token pair with the default timeout.
    ///
    /// # Errors
    /// Returns `SqlPipelineError::ConfigError` if either value is empty or the endpoint has an
    /// unsupported scheme.
    pub fn new(url: &str, auth_token: &str) -> Result<Self, SqlPipelineError> {
        PipelineConfigBuilder::new(url, auth_token).build()
    }

    #[must_use]
    pub fn builder(url: &str, auth_token: &str) -> PipelineConfigBuilder {
        PipelineConfigBuilder::new(url, auth_token)
    }

    /// Load from `TURSO_URL`, `TURSO_TOKEN` and the optional `TURSO_TIMEOUT_SECS`.
    ///
    /// # Errors
    /// Returns `SqlPipelineError::ConfigError` when a required variable is unset or invalid.
    pub fn from_env() -> Result<Self, SqlPipelineError> {
        let url = std::env::var(ENV_URL).unwrap_or_default();
        let token = std::env::var(ENV_TOKEN).unwrap_or_default();
        let mut builder = PipelineConfigBuilder::new(&url, &token);
        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
            builder = builder.timeout(parse_timeout_secs(&raw)?);
        }
        builder.build()
    }

    /// Fully-qualified pipeline endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    /// Deadline applied to each HTTP round trip.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

// Keep the credential out of logs.
impl std::fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("endpoint", &self.endpoint)
            .field("auth_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Fluent builder for [`PipelineConfig`].
#[derive(Debug, Clone)]
pub struct PipelineConfigBuilder {
    url: String,
    auth_token: String,
    timeout: Duration,
}

impl PipelineConfigBuilder {
    #[must_use]
    pub fn new(url: &str, auth_token: &str) -> Self {
        Self {
            url: url.to_string(),
            auth_token: auth_token.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// # Errors
    /// Returns `SqlPipelineError::ConfigError` for an empty token, zero timeout or an endpoint
    /// [`normalize_endpoint`] rejects.
    pub fn build(self) -> Result<PipelineConfig, SqlPipelineError> {
        let endpoint = normalize_endpoint(&self.url)?;
        let auth_token = self.auth_token.trim();
        if auth_token.is_empty() {
            return Err(SqlPipelineError::ConfigError(format!(
                "{ENV_TOKEN} (bearer credential) is required"
            )));
        }
        if self.timeout.is_zero() {
            return Err(SqlPipelineError::ConfigError(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(PipelineConfig {
            endpoint,
            auth_token: auth_token.to_string(),
            timeout: self.timeout,
        })
    }
}

/// Rewrite a `libsql://` connection string or an `http(s)://` base address into the
/// `https://host/.../v2/pipeline` form.
///
/// ```rust
/// use sql_pipeline::config::normalize_endpoint;
///
/// assert_eq!(
///     normalize_endpoint("libsql://jobs-acme.turso.io").unwrap(),
///     "https://jobs-acme.turso.io/v2/pipeline"
/// );
/// ```
///
/// # Errors
/// Returns `SqlPipelineError::ConfigError` for an empty value or any other scheme.
pub fn normalize_endpoint(url: &str) -> Result<String, SqlPipelineError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(SqlPipelineError::ConfigError(format!(
            "{ENV_URL} (pipeline endpoint) is required"
        )));
    }

    let (scheme, rest) = if let Some(rest) = url.strip_prefix("libsql://") {
        ("https", rest)
    } else if let Some(rest) = url.strip_prefix("https://") {
        ("https", rest)
    } else if let Some(rest) = url.strip_prefix("http://") {
        ("http", rest)
    } else {
        return Err(SqlPipelineError::ConfigError(format!(
            "unsupported endpoint {url:?}: expected libsql:// or http(s)://"
        )));
    };

    let rest = rest.trim_end_matches('/');
    if rest.is_empty() || rest.starts_with('/') {
        return Err(SqlPipelineError::ConfigError(format!(
            "endpoint {url:?} has no host"
        )));
    }
    if rest.ends_with(PIPELINE_PATH) {
        Ok(format!("{scheme}://{rest}"))
    } else {
        Ok(format!("{scheme}://{rest}{PIPELINE_PATH}"))
    }
}

fn parse_timeout_secs(raw: &str) -> Result<Duration, SqlPipelineError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| {
            SqlPipelineError::ConfigError(format!("{ENV_TIMEOUT_SECS} must be whole seconds: {e}"))
        })
}
