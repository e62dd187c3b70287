//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → handler.rs (static files, match, authorize, dispatch)
//!     → request.rs (classify, parse query/cookies, lazy body)
//!     → [render pipeline]
//!     → response.rs (HTML / JSON, cookies, error shapes)
//!     → Send to client
//! ```

pub mod cookies;
pub mod error;
pub mod handler;
pub mod request;
pub mod response;
pub mod server;
pub mod static_files;

pub use cookies::Cookies;
pub use error::{not_found, unauthorized_error, validation_error, ErrorKind, FieldError, RoutingError};
pub use request::{Query, RequestContext, RequestHead, RequestKind};
pub use server::{AppState, HttpServer};
pub use static_files::StaticFiles;
