//! Session resolution and route authorization.
//!
//! # Responsibilities
//! - Resolve the session through an ordered list of guards
//! - Memoize the resolved session for the rest of the request
//! - Enforce a route's required claims
//!
//! # Design Decisions
//! - First guard that verifies wins; later guards are not consulted
//! - Fail closed: a missing claim, a `null` claim and a different value are
//!   all Forbidden, never partial success
//! - Public routes (no permissions) never resolve a session

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::AuthConfig;
use crate::http::error::RoutingError;
use crate::http::request::{RequestContext, RequestHead};
use crate::routing::Route;

/// Claims a guard attaches to a verified request.
pub type SessionData = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    data: SessionData,
}

impl Session {
    pub fn new(data: SessionData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.data.get(claim)
    }
}

/// Verifies a request and returns its session data.
pub trait SessionGuard: Send + Sync + fmt::Debug {
    fn verify(&self, request: &RequestHead) -> Option<SessionData>;
}

/// Ordered guard list plus the authorization rule.
#[derive(Debug, Clone, Default)]
pub struct AuthGuard {
    guards: Vec<Arc<dyn SessionGuard>>,
}

impl AuthGuard {
    pub fn new(guards: Vec<Arc<dyn SessionGuard>>) -> Self {
        Self { guards }
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// The request's session, resolving and caching it on first success.
    pub fn session(&self, ctx: &mut RequestContext) -> Option<Session> {
        if let Some(session) = ctx.session() {
            return Some(session.clone());
        }
        let data = self
            .guards
            .iter()
            .find_map(|guard| guard.verify(ctx.head()))?;
        let session = Session::new(data);
        ctx.set_session(session.clone());
        Some(session)
    }

    pub fn authorize(&self, route: &Route, ctx: &mut RequestContext) -> Result<(), RoutingError> {
        if route.is_public() {
            return Ok(());
        }

        let session = self.session(ctx).ok_or_else(RoutingError::unauthorized)?;

        for (claim, expected) in route.permissions() {
            match session.get(claim) {
                Some(actual) if !actual.is_null() && actual == expected => {}
                _ => {
                    tracing::debug!(
                        request_id = %ctx.head().request_id(),
                        route = %route.path(),
                        claim = %claim,
                        "Permission denied"
                    );
                    return Err(RoutingError::forbidden());
                }
            }
        }
        Ok(())
    }
}

/// Guard accepting `Authorization: Bearer <token>` for configured tokens.
pub struct BearerTokenGuard {
    tokens: HashMap<String, SessionData>,
}

impl BearerTokenGuard {
    pub fn new(tokens: HashMap<String, SessionData>) -> Self {
        Self { tokens }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        let tokens = config
            .tokens
            .iter()
            .map(|entry| (entry.token.clone(), entry.claims.clone()))
            .collect();
        Self { tokens }
    }
}

impl fmt::Debug for BearerTokenGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerTokenGuard")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

impl SessionGuard for BearerTokenGuard {
    fn verify(&self, request: &RequestHead) -> Option<SessionData> {
        let token = request
            .header("authorization")?
            .strip_prefix("Bearer ")?
            .trim();
        self.tokens.get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteComponent;
    use crate::views::Node;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn claims(value: Value) -> SessionData {
        value.as_object().cloned().unwrap_or_default()
    }

    fn context(token: Option<&str>) -> RequestContext {
        let mut builder = Request::builder().uri("/patients");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        RequestContext::new(RequestHead::from_parts(&parts), Body::empty(), "Test", 1024)
    }

    fn route(permissions: &[(&str, Value)]) -> Route {
        let mut route = Route::new("/patients")
            .component(RouteComponent::view("patients").render(|_| Ok(Node::Empty)));
        for (claim, value) in permissions {
            route = route.permission(*claim, value.clone());
        }
        route
    }

    fn bearer() -> AuthGuard {
        let mut tokens = HashMap::new();
        tokens.insert("admin-token".to_string(), claims(json!({"role": "admin"})));
        tokens.insert("user-token".to_string(), claims(json!({"role": "user", "team": null})));
        AuthGuard::new(vec![Arc::new(BearerTokenGuard::new(tokens)) as Arc<dyn SessionGuard>])
    }

    #[test]
    fn test_public_route_skips_guards() {
        let mut ctx = context(None);
        assert!(bearer().authorize(&route(&[]), &mut ctx).is_ok());
        assert!(ctx.session().is_none());
    }

    #[test]
    fn test_missing_session_is_unauthorized() {
        let mut ctx = context(None);
        let err = bearer()
            .authorize(&route(&[("role", json!("admin"))]), &mut ctx)
            .unwrap_err();
        assert_eq!(err.status().as_u16(), 401);
    }

    #[test]
    fn test_claim_mismatch_is_forbidden() {
        let guard = bearer();
        let mut ctx = context(Some("user-token"));
        let err = guard
            .authorize(&route(&[("role", json!("admin"))]), &mut ctx)
            .unwrap_err();
        assert_eq!(err.status().as_u16(), 403);

        let mut ctx = context(Some("admin-token"));
        assert!(guard.authorize(&route(&[("role", json!("admin"))]), &mut ctx).is_ok());

        let err = guard
            .authorize(
                &route(&[("role", json!("admin")), ("ward", json!("north"))]),
                &mut ctx,
            )
            .unwrap_err();
        assert_eq!(err.status().as_u16(), 403);
    }

    #[test]
    fn test_null_claim_never_matches() {
        let mut ctx = context(Some("user-token"));
        let err = bearer()
            .authorize(&route(&[("team", Value::Null)]), &mut ctx)
            .unwrap_err();
        assert_eq!(err.status().as_u16(), 403);
    }

    #[derive(Debug, Default)]
    struct CountingGuard {
        calls: AtomicUsize,
    }

    impl SessionGuard for CountingGuard {
        fn verify(&self, _request: &RequestHead) -> Option<SessionData> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Some(claims(json!({"role": "admin"})))
        }
    }

    #[test]
    fn test_session_is_memoized_and_first_guard_wins() {
        let first = Arc::new(CountingGuard::default());
        let second = Arc::new(CountingGuard::default());
        let guard = AuthGuard::new(vec![first.clone() as Arc<dyn SessionGuard>, second.clone()]);

        let mut ctx = context(None);
        let admin = route(&[("role", json!("admin"))]);
        guard.authorize(&admin, &mut ctx).unwrap();
        guard.authorize(&admin, &mut ctx).unwrap();

        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
        assert_eq!(ctx.session().unwrap().get("role"), Some(&json!("admin")));
    }
}
