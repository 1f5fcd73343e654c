//! Client error types.

/// Errors that can occur during admin API operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A transport-level error (connection refused, timeout, TLS, etc.).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Admin configuration is missing or malformed.
    #[error("config error: {0}")]
    Config(String),

    /// The alias is not present in the admin configuration.
    #[error("unknown alias '{0}': add it to the admin config first")]
    UnknownAlias(String),

    /// An internal / unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for ClientError {
    fn from(err: anyhow::Error) -> Self {
        ClientError::Internal(err.to_string())
    }
}

/// Convenience result type.
pub type ClientResult<T> = std::result::Result<T, ClientError>;
