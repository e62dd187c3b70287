//! Route definitions.

use indexmap::IndexMap;
use serde_json::Value;

use crate::routing::component::RouteComponent;

/// Claim name → required value. Empty means public.
pub type Permissions = IndexMap<String, Value>;

/// A URL template with its component chain, optional action and permissions.
#[derive(Debug, Clone)]
pub struct Route {
    path: String,
    views: Vec<RouteComponent>,
    action: Option<RouteComponent>,
    permissions: Permissions,
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            views: Vec::new(),
            action: None,
            permissions: Permissions::new(),
        }
    }

    /// Append to the chain. Layouts first, most specific last.
    pub fn component(mut self, component: RouteComponent) -> Self {
        self.views.push(component);
        self
    }

    pub fn action(mut self, action: RouteComponent) -> Self {
        self.action = Some(action);
        self
    }

    /// Require `claim` to equal `value` on the session.
    pub fn permission(mut self, claim: impl Into<String>, value: impl Into<Value>) -> Self {
        self.permissions.insert(claim.into(), value.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn views(&self) -> &[RouteComponent] {
        &self.views
    }

    pub fn action_component(&self) -> Option<&RouteComponent> {
        self.action.as_ref()
    }

    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    pub fn is_public(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Every component of the route, views first.
    pub(crate) fn components(&self) -> impl Iterator<Item = &RouteComponent> {
        self.views.iter().chain(self.action.iter())
    }
}
