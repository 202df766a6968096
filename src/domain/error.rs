//! Domain Errors
//!
//! Three classes: configuration errors halt startup, upstream errors fail a
//! single query, and query errors are what the orchestrator hands back to
//! the HTTP layer.

use crate::domain::value_objects::ProviderId;

/// Invalid upstream configuration. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown upstream provider '{0}'")]
    UnknownProvider(String),
    #[error("unknown upstream mode '{0}'")]
    UnknownMode(String),
    #[error("upstream pool is empty")]
    EmptyPool,
    #[error("rotate interval must be positive, got {0}s")]
    NonPositiveInterval(i64),
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

/// Failure talking to, or interpreting, one upstream provider.
///
/// Every variant is classified as an upstream error at the client
/// boundary. The payload carries the raw cause for logging only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream request timed out")]
    Timeout,
    #[error("HTTP request error: {0}")]
    Transport(String),
    #[error("response is not 200 OK: {0}")]
    Status(u16),
    #[error("JSON parse error: {0}")]
    Decode(String),
    #[error("response error: {0}")]
    ProviderFailure(String),
    #[error("unknown response status '{0}'")]
    UnknownStatus(String),
    #[error("wrong AS format: '{0}'")]
    MalformedAsn(String),
    #[error("wrong organization format: '{0}'")]
    MalformedOrg(String),
    #[error("can not load timezone '{0}'")]
    UnknownTimezone(String),
    #[error("unknown country code '{0}'")]
    UnknownCountry(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Error returned by the query orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("upstream {provider} failed: {source}")]
    Upstream {
        provider: ProviderId,
        #[source]
        source: UpstreamError,
    },
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

impl QueryError {
    /// Generic text safe to show to end users.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Upstream { .. } => "Upstream error",
            Self::Configuration(_) => "Internal Server Error",
        }
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}
