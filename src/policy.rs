use crate::services::delay::DelayBounds;
use serde::{Deserialize, Serialize};

/// Backoff schedule consumed by the fetch client and the search orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Before the first attempt at a URL.
    pub first_attempt: DelayBounds,
    /// Before every later attempt.
    pub retry: DelayBounds,
    /// Extra cooldown after a 429.
    pub rate_limited: DelayBounds,
    /// Extra backoff after a transport error or timeout (skipped after the last attempt).
    pub transport_error: DelayBounds,
    /// Between fallback queries.
    pub query_cooldown: DelayBounds,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            first_attempt: DelayBounds::from_secs(2, 5),
            retry: DelayBounds::from_secs(5, 10),
            rate_limited: DelayBounds::from_secs(10, 20),
            transport_error: DelayBounds::from_secs(5, 10),
            query_cooldown: DelayBounds::from_secs(3, 7),
        }
    }
}

impl RetryPolicy {
    pub fn validate(&self) -> Result<(), String> {
        for (name, bounds) in [
            ("first_attempt", self.first_attempt),
            ("retry", self.retry),
            ("rate_limited", self.rate_limited),
            ("transport_error", self.transport_error),
            ("query_cooldown", self.query_cooldown),
        ] {
            bounds.validate().map_err(|e| format!("{}: {}", name, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pacing_schedule() {
        let p = RetryPolicy::default();
        assert_eq!(p.first_attempt, DelayBounds::from_millis(2_000, 5_000));
        assert_eq!(p.retry, DelayBounds::from_millis(5_000, 10_000));
        assert_eq!(p.rate_limited, DelayBounds::from_millis(10_000, 20_000));
        assert_eq!(p.transport_error, DelayBounds::from_millis(5_000, 10_000));
        assert_eq!(p.query_cooldown, DelayBounds::from_millis(3_000, 7_000));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn validate_names_offending_window() {
        let p = RetryPolicy {
            rate_limited: DelayBounds::from_millis(5, 1),
            ..Default::default()
        };
        let err = p.validate().unwrap_err();
        assert!(err.starts_with("rate_limited"), "{}", err);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let p: RetryPolicy =
            serde_json::from_str(r#"{"retry": {"min_ms": 100, "max_ms": 200}}"#).unwrap();
        assert_eq!(p.retry, DelayBounds::from_millis(100, 200));
        assert_eq!(p.first_attempt, RetryPolicy::default().first_attempt);
    }
}
