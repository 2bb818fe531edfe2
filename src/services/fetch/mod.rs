//! Paced, bounded page retrieval.
//!
//! Every attempt waits first, then sends one GET with a freshly drawn identity.
//! Only a 200 ends the loop early; everything else is absorbed here and the
//! caller sees either a [`Page`] or [`FetchError::Exhausted`].

mod transport;


pub use transport::*;

use crate::error::FetchError;
use crate::policy::RetryPolicy;
use crate::services::delay::{self, Sleeper};
use crate::services::gate::HostGate;
use crate::services::identity::IdentityPool;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// A successfully fetched document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub html: String,
    /// Attempts spent, including the successful one.
    pub attempts: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    RateLimited,
    Status(u16),
    Transport(String),
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Success => f.write_str("ok"),
            AttemptOutcome::RateLimited => f.write_str("rate limited (429)"),
            AttemptOutcome::Status(code) => write!(f, "status {}", code),
            AttemptOutcome::Transport(e) => f.write_str(e),
        }
    }
}

/// One attempt of a fetch. Only ever logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAttempt {
    /// 1-based.
    pub index: usize,
    pub waited: Duration,
    pub outcome: AttemptOutcome,
}

impl FetchAttempt {
    fn log(&self, url: &str, max_attempts: usize) {
        match &self.outcome {
            AttemptOutcome::Success => tracing::info!(
                url,
                attempt = self.index,
                waited_ms = self.waited.as_millis() as u64,
                "fetched"
            ),
            AttemptOutcome::RateLimited => tracing::warn!(
                url,
                attempt = self.index,
                max_attempts,
                "rate limited, cooling down"
            ),
            AttemptOutcome::Status(status) => tracing::warn!(
                url,
                attempt = self.index,
                max_attempts,
                status,
                "request failed"
            ),
            AttemptOutcome::Transport(error) => tracing::error!(
                url,
                attempt = self.index,
                max_attempts,
                error = error.as_str(),
                "request error"
            ),
        }
    }
}

pub struct FetchClient {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    identities: IdentityPool,
    retry: RetryPolicy,
    gate: Option<HostGate>,
}

impl FetchClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
        identities: IdentityPool,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            sleeper,
            identities,
            retry,
            gate: None,
        }
    }

    /// Serialize attempts per host through `gate`.
    pub fn with_gate(mut self, gate: HostGate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Fetch `url`, spending at most `max_attempts` requests.
    pub async fn fetch(&self, url: &str, max_attempts: usize) -> Result<Page, FetchError> {
        if max_attempts == 0 {
            return Err(FetchError::InvalidInput(
                "max_attempts must be at least 1".into(),
            ));
        }
        let parsed = Url::parse(url)
            .map_err(|e| FetchError::InvalidInput(format!("invalid url {}: {}", url, e)))?;
        let host = parsed.host_str().unwrap_or_default().to_string();
        let origin = parsed.origin().ascii_serialization();

        let start = Instant::now();

        for index in 1..=max_attempts {
            // Held for the whole iteration, waits included.
            let _permit = match &self.gate {
                Some(gate) => Some(gate.acquire(&host).await),
                None => None,
            };

            let bounds = if index == 1 {
                self.retry.first_attempt
            } else {
                self.retry.retry
            };
            let waited = delay::wait(self.sleeper.as_ref(), bounds).await;

            let identity = self.identities.pick(&origin);
            tracing::info!(
                url,
                attempt = index,
                transport = self.transport.name(),
                "making request"
            );

            let (outcome, body) = match self.transport.get(url, identity.headers()).await {
                Ok(resp) if resp.status == 200 => (AttemptOutcome::Success, Some(resp.body)),
                Ok(resp) if resp.status == 429 => (AttemptOutcome::RateLimited, None),
                Ok(resp) => (AttemptOutcome::Status(resp.status), None),
                Err(e) => (AttemptOutcome::Transport(e.to_string()), None),
            };

            let attempt = FetchAttempt {
                index,
                waited,
                outcome,
            };
            attempt.log(url, max_attempts);

            if let Some(html) = body {
                return Ok(Page {
                    url: url.to_string(),
                    html,
                    attempts: index,
                    duration_ms: start.elapsed().as_millis() as u64,
                });
            }

            match attempt.outcome {
                AttemptOutcome::RateLimited => {
                    delay::wait(self.sleeper.as_ref(), self.retry.rate_limited).await;
                }
                AttemptOutcome::Transport(_) if index < max_attempts => {
                    delay::wait(self.sleeper.as_ref(), self.retry.transport_error).await;
                }
                _ => {}
            }
        }

        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: max_attempts,
        })
    }
}
