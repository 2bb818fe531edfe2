//! Randomized pacing between requests.

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Inclusive wait window in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayBounds {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayBounds {
    pub const fn from_secs(min: u64, max: u64) -> Self {
        Self {
            min_ms: min * 1_000,
            max_ms: max * 1_000,
        }
    }

    pub const fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.min_ms > self.max_ms {
            return Err(format!(
                "delay min {}ms exceeds max {}ms",
                self.min_ms, self.max_ms
            ));
        }
        Ok(())
    }

    /// Draw a uniformly random duration inside the window.
    ///
    /// With a positive upper bound the result is at least 1ms, so a `[0, n]`
    /// window never degenerates into a busy loop.
    pub fn draw(&self) -> Duration {
        self.draw_with(&mut rand::thread_rng())
    }

    pub fn draw_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let (lo, hi) = if self.min_ms <= self.max_ms {
            (self.min_ms, self.max_ms)
        } else {
            (self.max_ms, self.min_ms)
        };
        if hi == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rng.gen_range(lo.max(1)..=hi))
    }
}

/// Suspends the current unit of work.
///
/// Injected everywhere a wait happens so tests can observe the schedule
/// without sleeping.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Sleep for `duration` and report how long was actually spent.
    async fn sleep(&self, duration: Duration) -> Duration;
}

/// Real timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) -> Duration {
        let start = Instant::now();
        tokio::time::sleep(duration).await;
        start.elapsed()
    }
}

/// Wait a random duration drawn from `bounds`; returns the elapsed time.
pub async fn wait(sleeper: &dyn Sleeper, bounds: DelayBounds) -> Duration {
    let duration = bounds.draw();
    tracing::debug!(
        wait_ms = duration.as_millis() as u64,
        "waiting {:.2}s",
        duration.as_secs_f64()
    );
    sleeper.sleep(duration).await
}
