//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Matched route (+ previous route):
//!     → auth.rs (resolve session through ordered guards)
//!     → compare route permissions with session claims
//!     → Pass to renderer, or Unauthorized / Forbidden
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any missing or mismatched claim
//! - No trust in client input; guards see only the request head

pub mod auth;

pub use auth::{AuthGuard, BearerTokenGuard, Session, SessionData, SessionGuard};
