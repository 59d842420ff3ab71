//! Health reporting subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health/check
//!     → state.rs (GREEN → "gateway is running", YELLOW → 503 draining)
//!
//! Shutdown sequence
//!     → state.rs mark_draining (before any socket closes)
//! ```
//!
//! # Design Decisions
//! - Status is process-scoped, owned by the server and injected as a handle
//! - Lock-free reads on every health check

pub mod state;

pub use state::{HealthState, HealthStatus};
