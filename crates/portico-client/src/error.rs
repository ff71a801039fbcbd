use portico_protocol::ProtocolError;

/// Errors that can occur while talking to the session service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never got an answer (DNS, connect, timeout, TLS).
    #[cfg(feature = "http")]
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for logs.
        body: String,
    },

    /// The response body didn't match the expected shape.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The configured base URL can't be joined with an endpoint path.
    #[error("invalid service url: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Returns `true` when the service rejected the credential or code
    /// (401/403), as opposed to being unreachable or broken.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}
