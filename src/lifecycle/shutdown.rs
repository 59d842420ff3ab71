//! Shutdown coordination for the gateway.
//!
//! # Sequence
//! ```text
//! trigger (signal or programmatic)
//!     → health Yellow          (before any socket closes)
//!     → sleep quiescence       (load balancer notices Yellow)
//!     → drain wait             (bounded, best effort)
//!     → server stops accepting, open connections finish
//! ```
//! The sequence body runs at most once no matter how many callers race into it.

use std::sync::Arc;

use tokio::sync::{watch, OnceCell};

use crate::health::HealthState;
use crate::lifecycle::drain::{wait_for_drain, DrainPolicy, DrainReport};
use crate::net::InFlightTracker;

/// Coordinator for graceful shutdown.
#[derive(Debug, Clone)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    policy: DrainPolicy,
    triggered: watch::Sender<bool>,
    report: OnceCell<DrainReport>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new(policy: DrainPolicy) -> Self {
        let (triggered, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                policy,
                triggered,
                report: OnceCell::new(),
            }),
        }
    }

    pub fn policy(&self) -> &DrainPolicy {
        &self.inner.policy
    }

    /// Request shutdown. Returns false if it was already requested.
    pub fn trigger(&self) -> bool {
        let first = !self.inner.triggered.send_replace(true);
        if first {
            tracing::info!("Shutdown requested");
        } else {
            tracing::info!("Shutdown already in progress");
        }
        first
    }

    /// Receiver that flips to `true` once shutdown is requested.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.triggered.subscribe()
    }

    /// Resolve once shutdown has been requested, including before this call.
    pub async fn triggered(&self) {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|triggered| *triggered).await;
    }

    /// Run the shutdown sequence. Concurrent and later callers all get the report
    /// of the single execution.
    pub async fn execute(&self, health: &HealthState, in_flight: &InFlightTracker) -> DrainReport {
        *self
            .inner
            .report
            .get_or_init(|| self.run_sequence(health, in_flight))
            .await
    }

    /// Report of the finished sequence, if it ran.
    pub fn report(&self) -> Option<DrainReport> {
        self.inner.report.get().copied()
    }

    async fn run_sequence(&self, health: &HealthState, in_flight: &InFlightTracker) -> DrainReport {
        let policy = self.inner.policy;
        health.mark_draining();

        tracing::info!(
            quiescence_ms = policy.quiescence.as_millis() as u64,
            "Waiting for load balancers to observe draining status"
        );
        tokio::time::sleep(policy.quiescence).await;

        tracing::info!(in_flight = in_flight.active(), "Ready to shut down gateway");
        let report = wait_for_drain(in_flight, &policy).await;
        tracing::info!(outcome = ?report.outcome, attempts = report.attempts, "Drain finished");
        report
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new(DrainPolicy::default())
    }
}
