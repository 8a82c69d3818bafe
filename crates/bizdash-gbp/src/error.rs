use bizdash_core::{ConfigError, CoreError};
use thiserror::Error;

/// Errors returned by the Business Profile client and data providers.
#[derive(Debug, Error)]
pub enum GbpError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("Business Profile API error: {0}")]
    ApiError(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("pagination limit reached for {resource}: exceeded {max_pages} pages")]
    PaginationLimit { resource: String, max_pages: usize },

    /// The credential has no Business Profile accounts.
    #[error("no Business Profile accounts available for this credential")]
    NoAccounts,

    /// The filter selects no known location.
    #[error("no locations match {0}")]
    EmptyScope(String),

    #[error(transparent)]
    Core(CoreError),

    #[error("snapshot configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<CoreError> for GbpError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyScope(scope) => GbpError::EmptyScope(scope),
            other => GbpError::Core(other),
        }
    }
}

impl GbpError {
    /// True for the "nothing to show" outcomes rather than real failures.
    #[must_use]
    pub fn is_empty_result(&self) -> bool {
        matches!(self, GbpError::NoAccounts | GbpError::EmptyScope(_))
    }
}
