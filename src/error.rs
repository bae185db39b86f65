//! Error types and result handling.
//!
//! Every fallible operation in this crate returns [`Result`] with a
//! [`FetchError`] payload. A non-2xx status is deliberately *not* an error:
//! dispatch hands those responses back to the caller decoded, and reports
//! them through the optional error hook instead.

use thiserror::Error;

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors that can end a dispatch.
///
/// Variants carry rendered messages rather than source errors so a builder
/// can stash one and replay it on every dispatch.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The timeout elapsed before the network call settled.
    #[error("Request timed out")]
    Timeout,

    /// The HTTP client failed to connect or to complete the exchange.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded as requested.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The request could not be assembled from its configuration.
    #[error("Invalid request: {0}")]
    Builder(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_builder() {
            FetchError::Builder(err.to_string())
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(FetchError::Timeout.to_string(), "Request timed out");
        assert_eq!(
            FetchError::Transport("connection refused".to_string()).to_string(),
            "Transport error: connection refused"
        );
        assert_eq!(
            FetchError::Decode("expected value".to_string()).to_string(),
            "Decode error: expected value"
        );
        assert_eq!(
            FetchError::Builder("bad header".to_string()).to_string(),
            "Invalid request: bad header"
        );
    }

    #[test]
    fn test_serde_json_error_becomes_decode() {
        let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert!(matches!(FetchError::from(err), FetchError::Decode(_)));
    }

    #[test]
    fn test_errors_clone_for_replay() {
        let err = FetchError::Builder("bad header".to_string());
        let replayed = err.clone();
        assert!(matches!(replayed, FetchError::Builder(msg) if msg == "bad header"));
    }
}
