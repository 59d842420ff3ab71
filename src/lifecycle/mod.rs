//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Build runtime → Bind listener → Start signal listener → Serve
//!
//! Shutdown (shutdown.rs + drain.rs):
//!     Signal received → Health Yellow → Quiescence sleep
//!     → Bounded drain wait → Stop accepting → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown (idempotent)
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then listeners
//! - Health flips before any socket closes
//! - Shutdown has a budget: proceeds after the deadline even with work in flight

pub mod drain;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use drain::{DrainOutcome, DrainPolicy, DrainReport};
pub use shutdown::Shutdown;
