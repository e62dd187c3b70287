//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Route handler and renderer produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (request counters, latency histogram, emitted actions)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every request log event
//! - Metric updates go through the `metrics` facade; without an installed
//!   recorder they are no-ops, so tests need no setup

pub mod logging;
pub mod metrics;
