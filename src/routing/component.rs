//! Route components: layouts, views, partials and actions.
//!
//! # Responsibilities
//! - Hold a component's callable together with its declared parameters
//! - Derive a stable id from the component's fully-qualified name
//!
//! # Design Decisions
//! - Parameters form a closed set resolved at registration time; the
//!   renderer binds each declared kind to its value at invocation time
//! - Blocking and async callables are distinct variants so the renderer
//!   can offload blocking ones to the blocking pool

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::response::Response;
use futures_util::future::{BoxFuture, FutureExt};

use crate::http::error::RoutingError;
use crate::render::args::ComponentArgs;
use crate::views::{Id, Node};

/// Prefix of component ids.
pub const COMPONENT_ID_PREFIX: &str = "v";

/// A parameter a component declares, bound by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentParam {
    /// The rendered output of the next inner component.
    Children,
    Page,
    Cookies,
    Headers,
    Body,
    Session,
    Query,
    /// A dynamic path segment, by name.
    Path(String),
}

impl From<&str> for ComponentParam {
    fn from(name: &str) -> Self {
        match name {
            "children" => ComponentParam::Children,
            "page" => ComponentParam::Page,
            "cookies" => ComponentParam::Cookies,
            "headers" => ComponentParam::Headers,
            "body" => ComponentParam::Body,
            "session" => ComponentParam::Session,
            "query" => ComponentParam::Query,
            other => ComponentParam::Path(other.to_string()),
        }
    }
}

impl fmt::Display for ComponentParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentParam::Children => f.write_str("children"),
            ComponentParam::Page => f.write_str("page"),
            ComponentParam::Cookies => f.write_str("cookies"),
            ComponentParam::Headers => f.write_str("headers"),
            ComponentParam::Body => f.write_str("body"),
            ComponentParam::Session => f.write_str("session"),
            ComponentParam::Query => f.write_str("query"),
            ComponentParam::Path(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Layout,
    View,
    Partial,
    Action,
}

impl ComponentKind {
    pub fn is_view_slot(&self) -> bool {
        !matches!(self, ComponentKind::Action)
    }
}

/// What an action component asks the renderer to answer with.
pub enum ActionOutcome {
    /// Answer with the collected actions envelope.
    Done,
    /// Answer with this response verbatim.
    Respond(Response),
}

impl fmt::Debug for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionOutcome::Done => f.write_str("Done"),
            ActionOutcome::Respond(response) => {
                write!(f, "Respond({})", response.status())
            }
        }
    }
}

#[derive(Debug)]
pub enum Output {
    View(Node),
    Action(ActionOutcome),
}

pub type BlockingFn = Arc<dyn Fn(ComponentArgs) -> Result<Output, RoutingError> + Send + Sync>;
pub type AsyncFn =
    Arc<dyn Fn(ComponentArgs) -> BoxFuture<'static, Result<Output, RoutingError>> + Send + Sync>;

#[derive(Clone)]
pub enum Callable {
    /// Run on the blocking pool.
    Blocking(BlockingFn),
    Async(AsyncFn),
}

impl Callable {
    pub fn is_async(&self) -> bool {
        matches!(self, Callable::Async(_))
    }
}

/// A bound, invocable unit of a route.
#[derive(Clone)]
pub struct RouteComponent {
    name: String,
    id: Id,
    kind: ComponentKind,
    params: Vec<ComponentParam>,
    is_root: bool,
    produces_view: bool,
    callable: Callable,
}

impl RouteComponent {
    pub fn layout(name: impl Into<String>) -> ComponentBuilder {
        ComponentBuilder::new(name.into(), ComponentKind::Layout)
    }

    pub fn view(name: impl Into<String>) -> ComponentBuilder {
        ComponentBuilder::new(name.into(), ComponentKind::View)
    }

    pub fn partial(name: impl Into<String>) -> ComponentBuilder {
        ComponentBuilder::new(name.into(), ComponentKind::Partial)
    }

    pub fn action(name: impl Into<String>) -> ComponentBuilder {
        ComponentBuilder::new(name.into(), ComponentKind::Action)
    }

    /// Fully-qualified name the id is derived from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn params(&self) -> &[ComponentParam] {
        &self.params
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn is_layout(&self) -> bool {
        self.kind == ComponentKind::Layout
    }

    pub fn is_partial(&self) -> bool {
        self.kind == ComponentKind::Partial
    }

    pub fn is_async(&self) -> bool {
        self.callable.is_async()
    }

    pub(crate) fn produces_view(&self) -> bool {
        self.produces_view
    }

    pub fn callable(&self) -> &Callable {
        &self.callable
    }
}

impl PartialEq for RouteComponent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RouteComponent {}

impl fmt::Debug for RouteComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteComponent")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("params", &self.params)
            .field("is_root", &self.is_root)
            .field("is_async", &self.is_async())
            .finish()
    }
}

/// Declares a component's parameters, then binds its callable.
#[derive(Debug, Clone)]
pub struct ComponentBuilder {
    name: String,
    kind: ComponentKind,
    params: Vec<ComponentParam>,
    is_root: bool,
}

impl ComponentBuilder {
    fn new(name: String, kind: ComponentKind) -> Self {
        Self {
            name,
            kind,
            params: Vec::new(),
            is_root: false,
        }
    }

    pub fn param(mut self, param: impl Into<ComponentParam>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn params<I, P>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ComponentParam>,
    {
        self.params.extend(params.into_iter().map(Into::into));
        self
    }

    /// Mark as the outermost layout, rendered without a fragment wrapper.
    pub fn root(mut self) -> Self {
        self.is_root = true;
        self
    }

    /// Bind a blocking render function.
    pub fn render<F>(self, f: F) -> RouteComponent
    where
        F: Fn(ComponentArgs) -> Result<Node, RoutingError> + Send + Sync + 'static,
    {
        let callable = Callable::Blocking(Arc::new(move |args| f(args).map(Output::View)));
        self.finish(callable, true)
    }

    pub fn render_async<F, Fut>(self, f: F) -> RouteComponent
    where
        F: Fn(ComponentArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Node, RoutingError>> + Send + 'static,
    {
        let callable = Callable::Async(Arc::new(move |args| {
            f(args).map(|result| result.map(Output::View)).boxed()
        }));
        self.finish(callable, true)
    }

    /// Bind a blocking action handler.
    pub fn handle<F>(self, f: F) -> RouteComponent
    where
        F: Fn(ComponentArgs) -> Result<ActionOutcome, RoutingError> + Send + Sync + 'static,
    {
        let callable = Callable::Blocking(Arc::new(move |args| f(args).map(Output::Action)));
        self.finish(callable, false)
    }

    pub fn handle_async<F, Fut>(self, f: F) -> RouteComponent
    where
        F: Fn(ComponentArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ActionOutcome, RoutingError>> + Send + 'static,
    {
        let callable = Callable::Async(Arc::new(move |args| {
            f(args).map(|result| result.map(Output::Action)).boxed()
        }));
        self.finish(callable, false)
    }

    fn finish(self, callable: Callable, produces_view: bool) -> RouteComponent {
        RouteComponent {
            id: Id::deterministic(&self.name, Some(COMPONENT_ID_PREFIX)),
            name: self.name,
            kind: self.kind,
            params: self.params,
            is_root: self.is_root,
            produces_view,
            callable,
        }
    }
}
