//! Route handler: the per-request state machine.
//!
//! # Data Flow
//! ```text
//! Request
//!     → static prefix? (GET/HEAD) → ServeDir
//!     → match current path        → NotFound
//!     → authorize current route   → Unauthorized / Forbidden
//!     → previous-path marker?     → match + authorize it too
//!     → POST/PUT/PATCH/DELETE     → action renderer
//!     → otherwise                 → view renderer
//!     → RoutingError              → error page or JSON envelope
//! ```
//!
//! # Design Decisions
//! - The single place where a `RoutingError` becomes a response
//! - The previous path is checked with the same rules as the current one,
//!   whatever the current path's outcome would be

use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::Response;

use crate::http::error::{ErrorKind, RoutingError};
use crate::http::request::{RequestContext, RequestHead};
use crate::http::response::error_response;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::render::strategy::Navigation;
use crate::render::{render_action, render_view};

/// Route label for requests that matched nothing.
const UNMATCHED: &str = "none";
const STATIC: &str = "static";

/// Axum fallback handler feeding every request into the pipeline.
pub async fn route_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    if state.static_files.matches(request.method(), request.uri().path()) {
        let response = match state.static_files.serve(request).await {
            Ok(response) => response,
            Err(err) => error_response(&err, false),
        };
        metrics::record_request(&method, response.status().as_u16(), STATIC, start);
        return response;
    }

    let (parts, body) = request.into_parts();
    let head = RequestHead::from_parts(&parts);
    let request_id = head.request_id().to_string();
    let path = head.path().to_string();
    let framework = head.is_framework();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        kind = head.kind().as_str(),
        "Handling request"
    );

    let mut ctx = RequestContext::new(
        head,
        body,
        &state.config.app.title,
        state.config.request.body_limit_bytes,
    );
    let mut route = UNMATCHED.to_string();

    let response = match dispatch(&state, &mut ctx, &mut route).await {
        Ok(response) => response,
        Err(err) => {
            log_error(&err, &request_id, &method, &path, &route);
            error_response(&err, framework)
        }
    };

    metrics::record_request(&method, response.status().as_u16(), &route, start);
    response
}

async fn dispatch(
    state: &AppState,
    ctx: &mut RequestContext,
    route_label: &mut String,
) -> Result<Response, RoutingError> {
    let matched = state
        .router
        .match_path(ctx.head().path())
        .ok_or_else(RoutingError::not_found)?;
    *route_label = matched.route.path().to_string();
    state.auth.authorize(&matched.route, ctx)?;

    let previous = match ctx.head().previous_path().map(str::to_string) {
        Some(previous_path) => {
            let previous = state
                .router
                .match_path(&previous_path)
                .ok_or_else(RoutingError::not_found)?;
            state.auth.authorize(&previous.route, ctx)?;
            Some((previous_path, previous))
        }
        None => None,
    };

    if ctx.head().is_mutating() {
        return render_action(&matched, ctx, &state.auth).await;
    }

    let navigation = match &previous {
        None => Navigation::Fresh,
        Some((previous_path, _)) if previous_path == ctx.head().path() => Navigation::Reload,
        Some((_, previous)) => Navigation::From(previous.route.views()),
    };
    let rendered = render_view(&matched, navigation, ctx, &state.auth).await?;
    rendered.into_response(ctx, &state.config.app.client_runtime)
}

fn log_error(err: &RoutingError, request_id: &str, method: &str, path: &str, route: &str) {
    if err.kind() == ErrorKind::Internal {
        tracing::error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            route = %route,
            status = err.status().as_u16(),
            error = %err,
            "Request failed"
        );
    } else {
        tracing::warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            route = %route,
            status = err.status().as_u16(),
            error = %err,
            "Request rejected"
        );
    }
}
