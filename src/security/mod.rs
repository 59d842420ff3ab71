//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Legal CallDescriptor:
//!     → auth.rs (apiKey / timestamp / secret check, when enabled)
//!     → Pass to RPC dispatch, or short-circuit with a rejection envelope
//! ```
//!
//! # Design Decisions
//! - Fail closed: any missing auth field rejects the request
//! - Verification is behind the `Authenticator` trait so it can be swapped

pub mod auth;

pub use auth::{AuthRejection, Authenticator, KeySecretAuthenticator};
