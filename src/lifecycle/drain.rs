//! Bounded wait for in-flight requests.
//!
//! Best effort: when the budget runs out the shutdown proceeds anyway and the
//! leftover count is reported.

use std::time::Duration;

use crate::config::ShutdownConfig;
use crate::net::InFlightTracker;

/// Timings of the shutdown sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainPolicy {
    /// Total time budget for the drain wait.
    pub timeout: Duration,
    /// Sleep between in-flight checks.
    pub poll_interval: Duration,
    /// Delay between going Yellow and starting the drain wait.
    pub quiescence: Duration,
}

impl DrainPolicy {
    /// Number of sleeps allowed: `floor(timeout / poll_interval)`, at least one.
    pub fn max_attempts(&self) -> u64 {
        let interval = self.poll_interval.as_millis().max(1);
        let attempts = self.timeout.as_millis() / interval;
        u64::try_from(attempts).unwrap_or(u64::MAX).max(1)
    }
}

impl From<&ShutdownConfig> for DrainPolicy {
    fn from(config: &ShutdownConfig) -> Self {
        Self {
            timeout: config.timeout(),
            poll_interval: config.poll_interval(),
            quiescence: config.quiescence(),
        }
    }
}

impl Default for DrainPolicy {
    fn default() -> Self {
        Self::from(&ShutdownConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every in-flight request finished.
    Drained,
    /// The budget ran out with requests still in flight.
    TimedOut { remaining: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    pub outcome: DrainOutcome,
    /// Poll intervals slept before the outcome was decided.
    pub attempts: u64,
}

/// Poll the tracker until it is idle or the attempt budget is spent.
pub async fn wait_for_drain(in_flight: &InFlightTracker, policy: &DrainPolicy) -> DrainReport {
    let budget = policy.max_attempts();
    let pending = in_flight.active();
    if pending > 0 {
        tracing::warn!(
            in_flight = pending,
            timeout_ms = policy.timeout.as_millis() as u64,
            "Requests still in flight, waiting for them to finish"
        );
    }

    let mut attempts = 0;
    while attempts < budget {
        if in_flight.is_idle() {
            return DrainReport {
                outcome: DrainOutcome::Drained,
                attempts,
            };
        }
        tracing::debug!(
            in_flight = in_flight.active(),
            sleep_ms = policy.poll_interval.as_millis() as u64,
            "Requests not drained yet"
        );
        tokio::time::sleep(policy.poll_interval).await;
        attempts += 1;
    }

    let remaining = in_flight.active();
    if remaining == 0 {
        return DrainReport {
            outcome: DrainOutcome::Drained,
            attempts,
        };
    }

    tracing::warn!(
        attempts,
        remaining,
        timeout_ms = policy.timeout.as_millis() as u64,
        "Drain budget exhausted, shutting down with requests in flight"
    );
    DrainReport {
        outcome: DrainOutcome::TimedOut { remaining },
        attempts,
    }
}
