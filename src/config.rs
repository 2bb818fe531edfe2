use crate::error::MarketError;
use crate::policy::RetryPolicy;
use crate::services::extract::DEFAULT_MAX_CONTAINERS;
use crate::services::fetch::DEFAULT_TIMEOUT_MS;
use crate::services::search::DEFAULT_MAX_ATTEMPTS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Queries tried, in order, after the primary one comes back empty.
pub const DEFAULT_FALLBACK_QUERIES: [&str; 6] = [
    "electronics",
    "books",
    "home kitchen",
    "clothing",
    "sports",
    "toys",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_attempts: usize,
    pub request_timeout_ms: u64,
    pub max_containers: usize,
    pub retry: RetryPolicy,
    pub fallback_queries: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            max_containers: DEFAULT_MAX_CONTAINERS,
            retry: RetryPolicy::default(),
            fallback_queries: DEFAULT_FALLBACK_QUERIES
                .iter()
                .map(|q| q.to_string())
                .collect(),
        }
    }
}

impl SearchConfig {
    /// Read a JSON config; missing keys keep their defaults.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: SearchConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.max_attempts == 0 {
            return Err(MarketError::config("max_attempts must be at least 1"));
        }
        if self.request_timeout_ms == 0 {
            return Err(MarketError::config("request_timeout_ms must be positive"));
        }
        if self.max_containers == 0 {
            return Err(MarketError::config("max_containers must be at least 1"));
        }
        self.retry.validate().map_err(MarketError::config)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::delay::DelayBounds;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.fallback_queries[2], "home kitchen");
    }

    #[test]
    fn load_merges_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"max_attempts": 5, "retry": {{"query_cooldown": {{"min_ms": 10, "max_ms": 20}}}}}}"#
        )
        .unwrap();

        let config = SearchConfig::load(file.path()).unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.max_containers, 20);
        assert_eq!(config.retry.query_cooldown, DelayBounds::from_millis(10, 20));
        assert_eq!(config.retry.retry, RetryPolicy::default().retry);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let zero = SearchConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(MarketError::Config(_))));

        let inverted = SearchConfig {
            retry: RetryPolicy {
                first_attempt: DelayBounds::from_millis(10, 1),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = inverted.validate().unwrap_err().to_string();
        assert!(err.contains("first_attempt"), "{}", err);
    }

    #[test]
    fn bad_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            SearchConfig::load(file.path()),
            Err(MarketError::Json(_))
        ));
    }
}
