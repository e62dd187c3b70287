//! Route table construction and lookup.
//!
//! # Responsibilities
//! - Validate routes once, at startup
//! - Store static routes in an exact-match map and dynamic routes in
//!   registration order
//! - Resolve a request path to a matched route and its parameters
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) static lookup via HashMap, tried before any pattern
//! - First registered dynamic match wins; no specificity scoring
//! - Explicit `None` rather than a silent default

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::routing::component::{ComponentKind, ComponentParam, RouteComponent};
use crate::routing::matcher::{self, PathPattern};
use crate::routing::route::Route;

#[derive(Debug, Error)]
pub enum RouteTableError {
    #[error("route path '{0}' must start with '/'")]
    InvalidPath(String),

    #[error("route path '{0}' is registered twice")]
    DuplicatePath(String),

    #[error("route '{0}' has neither views nor an action")]
    EmptyRoute(String),

    #[error("route '{path}': invalid parameter segment '{segment}'")]
    InvalidParamName { path: String, segment: String },

    #[error("route '{path}': parameter '{name}' appears twice")]
    DuplicateParam { path: String, name: String },

    #[error("route '{path}': component '{component}' declares unknown path parameter '{param}'")]
    UnknownPathParam {
        path: String,
        component: String,
        param: String,
    },

    #[error("route '{path}': component '{component}' declares parameter '{param}' more than once or where it cannot be bound")]
    InvalidParam {
        path: String,
        component: String,
        param: String,
    },

    #[error("route '{path}': component '{component}' is misplaced: {reason}")]
    MisplacedComponent {
        path: String,
        component: String,
        reason: &'static str,
    },

    #[error("invalid route pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Validated, immutable routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    static_routes: HashMap<String, Arc<Route>>,
    dynamic_routes: Vec<(PathPattern, Arc<Route>)>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    pub fn static_routes(&self) -> &HashMap<String, Arc<Route>> {
        &self.static_routes
    }

    pub fn dynamic_routes(&self) -> &[(PathPattern, Arc<Route>)] {
        &self.dynamic_routes
    }

    pub fn len(&self) -> usize {
        self.static_routes.len() + self.dynamic_routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    routes: Vec<Route>,
}

impl RouteTableBuilder {
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    pub fn build(self) -> Result<RouteTable, RouteTableError> {
        let mut table = RouteTable::default();
        let mut seen = HashSet::new();

        for route in self.routes {
            let path = route.path().to_string();
            if !path.starts_with('/') {
                return Err(RouteTableError::InvalidPath(path));
            }
            if !seen.insert(path.clone()) {
                return Err(RouteTableError::DuplicatePath(path));
            }
            if route.views().is_empty() && route.action_component().is_none() {
                return Err(RouteTableError::EmptyRoute(path));
            }
            validate_chain(&route)?;

            if matcher::is_dynamic(&path) {
                let pattern = PathPattern::compile(&path)?;
                validate_params(&route, pattern.params())?;
                table.dynamic_routes.push((pattern, Arc::new(route)));
            } else {
                validate_params(&route, &[])?;
                table.static_routes.insert(path, Arc::new(route));
            }
        }

        Ok(table)
    }
}

fn misplaced(route: &Route, component: &RouteComponent, reason: &'static str) -> RouteTableError {
    RouteTableError::MisplacedComponent {
        path: route.path().to_string(),
        component: component.name().to_string(),
        reason,
    }
}

/// Layouts first, then at most one view, then at most one partial.
fn validate_chain(route: &Route) -> Result<(), RouteTableError> {
    let mut last = ComponentKind::Layout;
    for (i, component) in route.views().iter().enumerate() {
        let kind = component.kind();
        if !kind.is_view_slot() || !component.produces_view() {
            return Err(misplaced(route, component, "actions cannot render views"));
        }
        if component.is_root() && (i != 0 || kind != ComponentKind::Layout) {
            return Err(misplaced(route, component, "only the first layout can be root"));
        }
        let out_of_order = match (last, kind) {
            (_, ComponentKind::Layout) => last != ComponentKind::Layout,
            (ComponentKind::Layout, _) => false,
            (ComponentKind::View, ComponentKind::Partial) => false,
            _ => true,
        };
        if out_of_order {
            return Err(misplaced(
                route,
                component,
                "chain must be layouts, then one view, then one partial",
            ));
        }
        last = kind;
    }

    if let Some(action) = route.action_component() {
        if action.kind() != ComponentKind::Action || action.produces_view() {
            return Err(misplaced(route, action, "only action components handle mutations"));
        }
    }
    Ok(())
}

fn validate_params(route: &Route, template_params: &[String]) -> Result<(), RouteTableError> {
    for component in route.components() {
        let mut declared = HashSet::new();
        for param in component.params() {
            let invalid = !declared.insert(param)
                || (*param == ComponentParam::Children && component.kind() == ComponentKind::Action);
            if invalid {
                return Err(RouteTableError::InvalidParam {
                    path: route.path().to_string(),
                    component: component.name().to_string(),
                    param: param.to_string(),
                });
            }
            if let ComponentParam::Path(name) = param {
                if !template_params.iter().any(|p| p == name) {
                    return Err(RouteTableError::UnknownPathParam {
                        path: route.path().to_string(),
                        component: component.name().to_string(),
                        param: name.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// A route resolved for one request.
#[derive(Debug, Clone)]
pub struct MatchedRoute {
    pub route: Arc<Route>,
    pub args: IndexMap<String, String>,
}

/// Read-only lookup over a [`RouteTable`].
#[derive(Debug, Clone)]
pub struct Router {
    table: Arc<RouteTable>,
}

impl Router {
    pub fn new(table: RouteTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Static paths first, then dynamic patterns in registration order.
    pub fn match_path(&self, path: &str) -> Option<MatchedRoute> {
        if let Some(route) = self.table.static_routes.get(path) {
            return Some(MatchedRoute {
                route: route.clone(),
                args: IndexMap::new(),
            });
        }

        self.table
            .dynamic_routes
            .iter()
            .find_map(|(pattern, route)| {
                pattern.captures(path).map(|args| MatchedRoute {
                    route: route.clone(),
                    args,
                })
            })
    }
}
