use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlPipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No usable HTTP response: connect failure, deadline expiry (`status: None`)
    /// or an HTTP status >= 400.
    #[error("Transport error ({}): {message}", status_label(*.status))]
    TransportError {
        status: Option<u16>,
        message: String,
    },

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// The remote answered the pipeline but reported an error for the statement.
    #[error("Remote error{}: {message}", code_label(.code.as_deref()))]
    RemoteError {
        code: Option<String>,
        message: String,
    },

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),
}

impl SqlPipelineError {
    /// Network failure or an HTTP error status.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TransportError { .. })
    }

    /// The remote answered, but not with the envelope an execute call expects.
    #[must_use]
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::ProtocolError(_) | Self::RemoteError { .. })
    }

    /// HTTP status carried by a transport error, if the remote answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::TransportError { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SqlPipelineError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request deadline exceeded: {err}")
        } else {
            err.to_string()
        };
        SqlPipelineError::TransportError {
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }
}

impl From<serde_json::Error> for SqlPipelineError {
    fn from(err: serde_json::Error) -> Self {
        SqlPipelineError::ProtocolError(format!("invalid JSON body: {err}"))
    }
}

fn status_label(status: Option<u16>) -> String {
    status.map_or_else(|| "no response".to_string(), |s| s.to_string())
}

fn code_label(code: Option<&str>) -> String {
    code.map(|c| format!(" [{c}]")).unwrap_or_default()
}
