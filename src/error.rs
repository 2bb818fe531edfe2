use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MarketError>;

/// Terminal outcome of the fetch layer.
///
/// Transport and status failures are retried inside the fetch client and never
/// surface individually; callers only ever see one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Every allowed attempt was spent without a 200 response.
    #[error("fetch exhausted after {attempts} attempt(s): {url}")]
    Exhausted { url: String, attempts: usize },

    /// The caller supplied something that can never succeed (unknown country,
    /// zero attempts, unparsable URL). Never retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Failure of a single request on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Request(String),
}

/// A structural pattern that could not be compiled into a selector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid pattern `{css}`: {reason}")]
pub struct PatternError {
    pub css: String,
    pub reason: String,
}

/// Coarse failure class reported alongside the error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad country, blank query, bad config. Retrying the same call is pointless.
    InvalidInput,
    /// The marketplace could not be reached or kept refusing.
    Upstream,
    Internal,
}

#[derive(Debug, Error)]
pub enum MarketError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("storage error during {operation}: {message}")]
    Storage { operation: String, message: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MarketError {
    pub fn config(msg: impl Into<String>) -> Self {
        MarketError::Config(msg.into())
    }

    pub fn storage(operation: &str, message: &str) -> Self {
        MarketError::Storage {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MarketError::Fetch(FetchError::InvalidInput(_)) | MarketError::Config(_) => {
                ErrorKind::InvalidInput
            }
            MarketError::Fetch(FetchError::Exhausted { .. }) | MarketError::Transport(_) => {
                ErrorKind::Upstream
            }
            MarketError::Storage { .. } | MarketError::Io(_) | MarketError::Json(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// True when the error was caused by caller input rather than the remote side.
    pub fn is_input_error(&self) -> bool {
        self.kind() == ErrorKind::InvalidInput
    }
}

/* Conversions so `?` works smoothly */
impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_mentions_attempts_and_url() {
        let err = FetchError::Exhausted {
            url: "https://www.amazon.com/s?k=books".into(),
            attempts: 3,
        };
        assert_eq!(
            err.to_string(),
            "fetch exhausted after 3 attempt(s): https://www.amazon.com/s?k=books"
        );
    }

    #[test]
    fn input_errors_are_flagged() {
        let err: MarketError = FetchError::InvalidInput("unsupported country code: ZZ".into()).into();
        assert!(err.is_input_error());

        let err: MarketError = FetchError::Exhausted {
            url: "u".into(),
            attempts: 1,
        }
        .into();
        assert!(!err.is_input_error());
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[test]
    fn errors_are_classified() {
        let config = MarketError::config("max_attempts must be at least 1");
        assert_eq!(config.kind(), ErrorKind::InvalidInput);
        assert!(config.is_input_error());

        let timeout = MarketError::from(TransportError::Timeout);
        assert_eq!(timeout.kind(), ErrorKind::Upstream);

        let storage = MarketError::storage("append", "disk full");
        assert_eq!(storage.kind(), ErrorKind::Internal);

        let json = serde_json::to_value(ErrorKind::InvalidInput).unwrap();
        assert_eq!(json, "invalid_input");
    }

    #[test]
    fn pattern_error_names_the_css() {
        let err = PatternError {
            css: "[[nope".into(),
            reason: "unexpected token".into(),
        };
        assert_eq!(err.to_string(), "invalid pattern `[[nope`: unexpected token");
    }
}
