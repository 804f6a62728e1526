//! Directions error types

use thiserror::Error;

use crate::client::TravelMode;

/// Errors that can occur while fetching or normalizing directions
#[derive(Debug, Error)]
pub enum DirectionsError {
    /// Connection to the directions provider failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// HTTP request to the provider failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse the provider response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimitExceeded {
        /// Seconds to wait before retrying (if provided by the API)
        retry_after_secs: Option<u64>,
    },

    /// The provider returned zero candidate routes
    #[error("No {mode} routes found")]
    NoRoutesFound {
        /// Travel mode of the failed request
        mode: TravelMode,
    },

    /// The provider rejected the request with a non-OK status
    #[error("Provider returned {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    ApiError {
        /// Provider status code (e.g. "REQUEST_DENIED")
        status: String,
        /// Human-readable message from the provider, if any
        message: Option<String>,
    },

    /// Invalid origin or destination
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// Request timeout
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },
}

impl DirectionsError {
    /// Returns true if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::RequestFailed(_)
                | Self::Timeout { .. }
                | Self::RateLimitExceeded { .. }
        )
    }
}
