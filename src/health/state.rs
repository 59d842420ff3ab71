//! Gateway health status.
//!
//! # States
//! - Green: normal operation, load balancers route traffic here
//! - Yellow: draining, load balancers should evict this node
//!
//! # State Transitions
//! ```text
//! Green → Yellow: first step of the shutdown sequence
//! ```
//! There is no way back to Green; a draining gateway always exits.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::observability::metrics;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Green = 0,
    Yellow = 1,
}

impl From<u8> for HealthStatus {
    fn from(val: u8) -> Self {
        match val {
            0 => HealthStatus::Green,
            _ => HealthStatus::Yellow,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Green => write!(f, "GREEN"),
            HealthStatus::Yellow => write!(f, "YELLOW"),
        }
    }
}

/// Shared handle to the process health status.
#[derive(Debug, Clone, Default)]
pub struct HealthState {
    status: Arc<AtomicU8>,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> HealthStatus {
        HealthStatus::from(self.status.load(Ordering::SeqCst))
    }

    /// Flip to Yellow. Returns the previous status.
    pub fn mark_draining(&self) -> HealthStatus {
        let previous = HealthStatus::from(
            self.status.swap(HealthStatus::Yellow as u8, Ordering::SeqCst),
        );
        if previous == HealthStatus::Green {
            tracing::info!(status = %HealthStatus::Yellow, "Health status changed");
            metrics::record_health(HealthStatus::Yellow);
        }
        previous
    }
}
