//! Argument binding for component invocation.
//!
//! Each component receives only the parameters it declared. Values are
//! resolved per invocation from the request context.

use axum::http::HeaderMap;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http::cookies::Cookies;
use crate::http::error::RoutingError;
use crate::http::request::{Query, RequestContext};
use crate::routing::{ComponentParam, RouteComponent};
use crate::security::auth::{AuthGuard, Session};
use crate::views::{Node, Page};

/// Values bound to a component's declared parameters.
#[derive(Debug, Default)]
pub struct ComponentArgs {
    component: String,
    children: Option<Node>,
    page: Option<Page>,
    cookies: Option<Cookies>,
    headers: Option<HeaderMap>,
    body: Option<Value>,
    session: Option<Option<Session>>,
    query: Option<Query>,
    path: IndexMap<String, String>,
}

impl ComponentArgs {
    /// Resolve every parameter `component` declares.
    pub(crate) async fn bind(
        component: &RouteComponent,
        ctx: &mut RequestContext,
        auth: &AuthGuard,
        children: Option<Node>,
        route_args: &IndexMap<String, String>,
    ) -> Result<Self, RoutingError> {
        let mut args = ComponentArgs {
            component: component.name().to_string(),
            ..Default::default()
        };
        let mut children = children;

        for param in component.params() {
            match param {
                ComponentParam::Children => {
                    args.children = Some(children.take().unwrap_or(Node::Empty));
                }
                ComponentParam::Page => args.page = Some(ctx.page().clone()),
                ComponentParam::Cookies => args.cookies = Some(ctx.head().cookies().clone()),
                ComponentParam::Headers => args.headers = Some(ctx.head().headers().clone()),
                ComponentParam::Body => args.body = Some(ctx.body().await?),
                ComponentParam::Session => args.session = Some(auth.session(ctx)),
                ComponentParam::Query => args.query = Some(ctx.head().query().clone()),
                ComponentParam::Path(name) => {
                    let value = route_args.get(name).ok_or_else(|| {
                        RoutingError::internal(format!(
                            "unsupported argument '{}' for route component '{}'",
                            name,
                            component.name()
                        ))
                    })?;
                    args.path.insert(name.clone(), value.clone());
                }
            }
        }
        Ok(args)
    }

    /// Arguments for direct calls, e.g. from tests.
    pub fn builder(component: impl Into<String>) -> ComponentArgsBuilder {
        ComponentArgsBuilder {
            args: ComponentArgs {
                component: component.into(),
                ..Default::default()
            },
        }
    }

    fn undeclared(&self, param: &str) -> RoutingError {
        RoutingError::internal(format!(
            "route component '{}' did not declare parameter '{}'",
            self.component, param
        ))
    }

    /// The inner component's output. Empty for the innermost component.
    pub fn take_children(&mut self) -> Result<Node, RoutingError> {
        self.children
            .take()
            .ok_or_else(|| self.undeclared("children"))
    }

    pub fn page(&self) -> Result<&Page, RoutingError> {
        self.page.as_ref().ok_or_else(|| self.undeclared("page"))
    }

    pub fn cookies(&self) -> Result<&Cookies, RoutingError> {
        self.cookies.as_ref().ok_or_else(|| self.undeclared("cookies"))
    }

    pub fn headers(&self) -> Result<&HeaderMap, RoutingError> {
        self.headers.as_ref().ok_or_else(|| self.undeclared("headers"))
    }

    pub fn body(&self) -> Result<&Value, RoutingError> {
        self.body.as_ref().ok_or_else(|| self.undeclared("body"))
    }

    /// The body decoded into `T`. A shape mismatch is a BadRequest.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, RoutingError> {
        serde_json::from_value(self.body()?.clone()).map_err(|err| {
            RoutingError::bad_request().with_message(format!("Invalid request body: {}", err))
        })
    }

    /// The resolved session, `None` when no guard verified the request.
    pub fn session(&self) -> Result<Option<&Session>, RoutingError> {
        self.session
            .as_ref()
            .map(Option::as_ref)
            .ok_or_else(|| self.undeclared("session"))
    }

    pub fn query(&self) -> Result<&Query, RoutingError> {
        self.query.as_ref().ok_or_else(|| self.undeclared("query"))
    }

    /// A dynamic path segment.
    pub fn path(&self, name: &str) -> Result<&str, RoutingError> {
        self.path
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| self.undeclared(name))
    }
}

/// Assembles [`ComponentArgs`] by hand.
#[derive(Debug)]
pub struct ComponentArgsBuilder {
    args: ComponentArgs,
}

impl ComponentArgsBuilder {
    pub fn children(mut self, children: Node) -> Self {
        self.args.children = Some(children);
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.args.page = Some(page);
        self
    }

    pub fn cookies(mut self, cookies: Cookies) -> Self {
        self.args.cookies = Some(cookies);
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.args.body = Some(body);
        self
    }

    pub fn session(mut self, session: Option<Session>) -> Self {
        self.args.session = Some(session);
        self
    }

    pub fn query(mut self, query: Query) -> Self {
        self.args.query = Some(query);
        self
    }

    pub fn path(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.path.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> ComponentArgs {
        self.args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::RequestHead;
    use crate::routing::RouteComponent;
    use axum::body::Body;
    use axum::http::Request;
    use serde::Deserialize;
    use serde_json::json;

    fn request_context(body: &'static str) -> RequestContext {
        let (parts, _) = Request::builder()
            .method("POST")
            .uri("/patients/42?tab=notes")
            .header("content-type", "application/json")
            .header("cookie", "theme=dark")
            .body(())
            .unwrap()
            .into_parts();
        RequestContext::new(RequestHead::from_parts(&parts), Body::from(body), "Clinic", 1024)
    }

    #[tokio::test]
    async fn test_binds_declared_params_only() {
        let component = RouteComponent::action("save")
            .params(["body", "query", "patient_id", "cookies"])
            .handle(|_| Ok(crate::routing::ActionOutcome::Done));
        let mut ctx = request_context(r#"{"note": "hi"}"#);
        let mut route_args = IndexMap::new();
        route_args.insert("patient_id".to_string(), "42".to_string());

        let args = ComponentArgs::bind(&component, &mut ctx, &AuthGuard::default(), None, &route_args)
            .await
            .unwrap();

        assert_eq!(args.body().unwrap(), &json!({"note": "hi"}));
        assert_eq!(args.query().unwrap().get("tab"), Some("notes"));
        assert_eq!(args.path("patient_id").unwrap(), "42");
        assert_eq!(args.cookies().unwrap().get("theme"), Some("dark"));
        assert!(args.page().is_err());
        assert!(args.headers().is_err());
        assert!(args.session().is_err());
    }

    #[tokio::test]
    async fn test_children_and_session_binding() {
        let component = RouteComponent::layout("layout")
            .params(["children", "session", "page"])
            .render(|_| Ok(Node::Empty));
        let mut ctx = request_context("");

        let mut args = ComponentArgs::bind(
            &component,
            &mut ctx,
            &AuthGuard::default(),
            Some(Node::text("inner")),
            &IndexMap::new(),
        )
        .await
        .unwrap();

        assert_eq!(args.take_children().unwrap().render(), "inner");
        assert_eq!(args.session().unwrap(), None);
        assert_eq!(args.page().unwrap().title, "Clinic");
    }

    #[derive(Debug, Deserialize)]
    struct Login {
        email: String,
    }

    #[test]
    fn test_body_as() {
        let args = ComponentArgs::builder("login")
            .body(json!({"email": "a@b.c"}))
            .build();
        assert_eq!(args.body_as::<Login>().unwrap().email, "a@b.c");

        let args = ComponentArgs::builder("login").body(json!({"nope": 1})).build();
        assert_eq!(args.body_as::<Login>().unwrap_err().status().as_u16(), 400);
    }
}
