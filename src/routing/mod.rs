//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     Route[] (path template + component chain + permissions)
//!     → router.rs (validate chains and declared parameters)
//!     → matcher.rs (compile `_name_` segments)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (path)
//!     → static map lookup
//!     → dynamic patterns, registration order
//!     → Return: MatchedRoute or None
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Unknown parameter names fail at build time, never per request
//! - Deterministic: same input always matches same route

pub mod component;
pub mod matcher;
pub mod route;
pub mod router;

pub use component::{
    ActionOutcome, Callable, ComponentBuilder, ComponentKind, ComponentParam, Output,
    RouteComponent,
};
pub use matcher::PathPattern;
pub use route::{Permissions, Route};
pub use router::{MatchedRoute, RouteTable, RouteTableBuilder, RouteTableError, Router};
