//! Routing subsystem: URL-to-RPC request mapping.
//!
//! # Data Flow
//! ```text
//! POST uri + headers + body
//!     → fields.rs (query / form / raw body fields)
//!     → resolver.rs (ordered URL grammars, first match wins)
//!         → arguments.rs (embedded `?k=v&k=v` on a segment)
//!         → cookies.rs (Cookie header)
//!     → descriptor.rs (immutable CallDescriptor, legal or illegal + cause)
//!
//! GET uri
//!     → echo.rs (/api/echo/{service}/{version})
//! ```
//!
//! # Design Decisions
//! - Grammars compiled once at startup, immutable at runtime
//! - Deterministic: same input always resolves the same way
//! - Nothing in this subsystem returns an error; bad input yields an illegal
//!   descriptor or a best-effort fallback

pub mod arguments;
pub mod cookies;
pub mod descriptor;
pub mod echo;
pub mod fields;
pub mod resolver;

pub use arguments::{resolve_arguments, ArgumentHolder};
pub use descriptor::{CallDescriptor, RpcTarget};
pub use echo::{match_echo_url, EchoTarget};
pub use fields::{FieldAccessor, RequestFields};
pub use resolver::UrlMappingResolver;
