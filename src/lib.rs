//! Trellis: server-rendered views with declarative client actions.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod render;
pub mod routing;
pub mod security;
pub mod views;

pub use config::AppConfig;
pub use http::{HttpServer, RoutingError};
pub use lifecycle::Shutdown;
pub use routing::{Route, RouteComponent, RouteTable};
