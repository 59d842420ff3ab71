//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup
//!     → listener.rs (bind configured address)
//!     → handed to the HTTP server accept loop
//!
//! Per request
//!     → connection.rs (in-flight guard taken on entry, released on exit)
//!     → shutdown drain polls the in-flight count
//! ```
//!
//! # Design Decisions
//! - The in-flight count is lock-free and safe to race across workers
//! - Release is tied to `Drop`, so no path can leak an increment

pub mod connection;
pub mod listener;

pub use connection::{InFlightGuard, InFlightTracker};
