use thiserror::Error;

/// Errors a [`MarketDataSource`](crate::providers::MarketDataSource)
/// implementation can produce for a single fetch.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The symbol is unknown to the provider (invalid or delisted).
    #[error("symbol not found: {0}")]
    NotFound(String),

    /// The provider refused the request due to rate limiting.
    #[error("rate limited by provider")]
    RateLimited,

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// Network-level or HTTP-level failure (DNS, TLS, unexpected status).
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered, but the payload could not be interpreted.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl SourceError {
    /// Maps a reqwest error, distinguishing timeouts from other transport
    /// failures so callers can report them separately.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}
