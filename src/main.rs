//! Trellis server binary.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ http::server ─▶ http::handler ─▶ routing::Router
//!                                         │
//!                                         ├─▶ security::auth (current + previous route)
//!                                         │
//!                                         ├─▶ render::view   (strategy → components → page/envelope)
//!                                         └─▶ render::action (action component → envelope/response)
//!
//!     Cross-cutting: config, observability (tracing + metrics), lifecycle (shutdown)
//! ```
//!
//! Serves the demo application in `demo.rs`.

mod demo;

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use trellis::config::{load_config, AppConfig};
use trellis::lifecycle::{shutdown_on_signal, Shutdown};
use trellis::observability::{logging, metrics};
use trellis::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "trellis", version, about = "Server-rendered views with declarative client actions")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "trellis starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        static_prefix = %config.static_files.prefix,
        request_timeout_secs = config.request.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, demo::routes()?);
    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(shutdown_on_signal(shutdown));

    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn get(path: &str) -> (StatusCode, String) {
        let app = HttpServer::new(AppConfig::default(), demo::routes().unwrap()).router();
        let response = app
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_demo_pages_render() {
        let (status, body) = get("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<title>Trellis</title>"));
        assert!(body.contains("Trellis demo"));

        let (status, body) = get("/login").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"id="login-form""#));
    }

    #[tokio::test]
    async fn test_demo_patients_require_session() {
        let (status, _) = get("/patients").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
