//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the route handler as its only handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener
//! - Stop on the shutdown broadcast, letting in-flight requests finish

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderName;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::http::handler::route_handler;
use crate::http::request::REQUEST_ID_HEADER;
use crate::http::static_files::StaticFiles;
use crate::lifecycle::shutdown;
use crate::routing::{RouteTable, Router as RouteRouter};
use crate::security::auth::{AuthGuard, BearerTokenGuard, SessionGuard};

/// Application state injected into the route handler.
#[derive(Clone)]
pub struct AppState {
    pub router: RouteRouter,
    pub auth: AuthGuard,
    pub static_files: StaticFiles,
    pub config: Arc<AppConfig>,
}

/// HTTP server for a route table.
pub struct HttpServer {
    router: Router,
    config: Arc<AppConfig>,
}

impl HttpServer {
    /// Bearer-token guards from `config.auth` are installed first.
    pub fn new(config: AppConfig, routes: RouteTable) -> Self {
        Self::with_guards(config, routes, Vec::new())
    }

    /// Like [`HttpServer::new`], with extra guards consulted after the
    /// configured bearer tokens.
    pub fn with_guards(
        config: AppConfig,
        routes: RouteTable,
        guards: Vec<Arc<dyn SessionGuard>>,
    ) -> Self {
        let mut all: Vec<Arc<dyn SessionGuard>> = Vec::with_capacity(guards.len() + 1);
        if !config.auth.tokens.is_empty() {
            all.push(Arc::new(BearerTokenGuard::from_config(&config.auth)));
        }
        all.extend(guards);

        let config = Arc::new(config);
        let state = AppState {
            router: RouteRouter::new(routes),
            auth: AuthGuard::new(all),
            static_files: StaticFiles::from_config(&config.static_files),
            config: config.clone(),
        };

        tracing::info!(
            routes = state.router.table().len(),
            guards = state.auth.len(),
            "Route table loaded"
        );

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
        Router::new()
            .fallback(route_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request.timeout_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
    }

    /// The configured Axum router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown_rx` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
