//! Static asset delegation for the reserved path prefix.

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, Uri};
use axum::response::Response;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::config::StaticFilesConfig;
use crate::http::error::RoutingError;

/// Files under `directory` served at `prefix`, for GET and HEAD only.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    prefix: String,
    directory: PathBuf,
}

impl StaticFiles {
    pub fn new(prefix: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            directory: directory.into(),
        }
    }

    pub fn from_config(config: &StaticFilesConfig) -> Self {
        Self::new(config.prefix.clone(), config.directory.clone())
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `request` targets a static asset.
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        matches!(*method, Method::GET | Method::HEAD) && path.starts_with(&self.prefix)
    }

    /// Serve the file. A missing file is the regular NotFound error.
    pub async fn serve(&self, request: Request<Body>) -> Result<Response, RoutingError> {
        let (mut parts, body) = request.into_parts();
        let relative = parts
            .uri
            .path()
            .strip_prefix(&self.prefix)
            .unwrap_or_default();
        parts.uri = format!("/{}", relative)
            .parse::<Uri>()
            .map_err(|_| RoutingError::not_found())?;

        let response = ServeDir::new(&self.directory)
            .oneshot(Request::from_parts(parts, body))
            .await
            .map_err(|err| RoutingError::internal(err.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(RoutingError::not_found()),
            _ => Ok(response.map(Body::new)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_safe_methods_under_prefix() {
        let files = StaticFiles::new("/public/", "public");
        assert!(files.matches(&Method::GET, "/public/app.js"));
        assert!(files.matches(&Method::HEAD, "/public/app.js"));
        assert!(!files.matches(&Method::POST, "/public/app.js"));
        assert!(!files.matches(&Method::GET, "/publicity"));
    }

    #[tokio::test]
    async fn test_serves_and_misses() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1);").unwrap();
        let files = StaticFiles::new("/public/", dir.path());

        let request = Request::get("/public/app.js").body(Body::empty()).unwrap();
        let response = files.serve(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"console.log(1);");

        let request = Request::get("/public/missing.js").body(Body::empty()).unwrap();
        let err = files.serve(request).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
