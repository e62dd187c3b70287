//! View replacement strategy.
//!
//! Decides which components of the current chain are rendered and which
//! previously rendered component the client replaces with the result.
//!
//! # Design Decisions
//! - Pure function of the request kind and both chains; no I/O
//! - Components are compared by id, never by position
//! - A plan the client could not apply is an internal error

use crate::http::error::RoutingError;
use crate::http::request::RequestKind;
use crate::routing::RouteComponent;
use crate::views::Id;

/// Where the client is navigating from.
#[derive(Debug, Clone, Copy)]
pub enum Navigation<'a> {
    /// No previous path: first load or a plain request.
    Fresh,
    /// The previous path is the current one.
    Reload,
    /// A different route, by its view chain.
    From(&'a [RouteComponent]),
}

/// Components to render, outermost first, and the id they replace.
#[derive(Debug)]
pub struct RenderPlan<'a> {
    pub components: Vec<&'a RouteComponent>,
    pub replaces: Option<Id>,
}

pub fn plan<'a>(
    kind: RequestKind,
    current: &'a [RouteComponent],
    navigation: Navigation<'_>,
) -> Result<RenderPlan<'a>, RoutingError> {
    if current.is_empty() {
        return Err(RoutingError::internal("Rendering resulted in an empty view"));
    }

    let full = RenderPlan {
        components: current.iter().collect(),
        replaces: None,
    };
    if kind == RequestKind::Form || !kind.is_framework() {
        return Ok(full);
    }

    match navigation {
        Navigation::Fresh => Ok(full),
        Navigation::Reload => reload(kind, current),
        Navigation::From(previous) => diff(current, previous),
    }
}

fn reload(kind: RequestKind, current: &[RouteComponent]) -> Result<RenderPlan<'_>, RoutingError> {
    let views: Vec<&RouteComponent> = current.iter().filter(|c| !c.is_layout()).collect();
    let last = *views
        .last()
        .ok_or_else(|| RoutingError::internal("No views found in the current route"))?;

    if kind == RequestKind::Partial {
        if views.len() < 2 {
            return Err(RoutingError::internal(
                "A partial reload needs a view and a partial",
            ));
        }
        if !last.is_partial() {
            return Err(RoutingError::internal(format!(
                "Last view must be a partial: '{}'",
                last.name()
            )));
        }
        return Ok(RenderPlan {
            components: vec![last],
            replaces: Some(last.id().clone()),
        });
    }

    let replaces = if last.is_partial() {
        if views.len() < 2 {
            return Err(RoutingError::internal(
                "A partial must follow the view it belongs to",
            ));
        }
        views[views.len() - 2].id().clone()
    } else {
        last.id().clone()
    };

    Ok(RenderPlan {
        components: views,
        replaces: Some(replaces),
    })
}

fn diff<'a>(
    current: &'a [RouteComponent],
    previous: &[RouteComponent],
) -> Result<RenderPlan<'a>, RoutingError> {
    let components: Vec<&RouteComponent> =
        current.iter().filter(|c| !previous.contains(*c)).collect();
    let replaces = previous
        .iter()
        .find(|p| !p.is_root() && !current.contains(*p))
        .map(|p| p.id().clone())
        .ok_or_else(|| {
            RoutingError::internal("Could not find a view to replace in the previous route")
        })?;

    if components.is_empty() {
        return Err(RoutingError::internal("Rendering resulted in an empty view"));
    }
    Ok(RenderPlan {
        components,
        replaces: Some(replaces),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::Node;

    fn layout(name: &str, root: bool) -> RouteComponent {
        let builder = RouteComponent::layout(name);
        let builder = if root { builder.root() } else { builder };
        builder.render(|_| Ok(Node::Empty))
    }

    fn view(name: &str) -> RouteComponent {
        RouteComponent::view(name).render(|_| Ok(Node::Empty))
    }

    fn partial(name: &str) -> RouteComponent {
        RouteComponent::partial(name).render(|_| Ok(Node::Empty))
    }

    fn names(plan: &RenderPlan<'_>) -> Vec<String> {
        plan.components.iter().map(|c| c.name().to_string()).collect()
    }

    #[test]
    fn test_plain_and_form_render_full_chain() {
        let chain = vec![layout("root", true), view("home")];
        for kind in [RequestKind::Plain, RequestKind::Form] {
            let plan = plan(kind, &chain, Navigation::From(&[])).unwrap();
            assert_eq!(names(&plan), vec!["root", "home"]);
            assert!(plan.replaces.is_none());
        }
    }

    #[test]
    fn test_framework_without_previous_path() {
        let chain = vec![layout("root", true), view("home")];
        let plan = plan(RequestKind::Link, &chain, Navigation::Fresh).unwrap();
        assert_eq!(names(&plan), vec!["root", "home"]);
        assert!(plan.replaces.is_none());
    }

    #[test]
    fn test_partial_reload_replaces_itself() {
        let chain = vec![layout("root", true), view("list"), partial("rows")];
        let plan = plan(RequestKind::Partial, &chain, Navigation::Reload).unwrap();
        assert_eq!(names(&plan), vec!["rows"]);
        assert_eq!(plan.replaces.as_ref(), Some(chain[2].id()));
    }

    #[test]
    fn test_link_reload_of_partial_replaces_view() {
        let chain = vec![layout("root", true), view("list"), partial("rows")];
        let plan = plan(RequestKind::Link, &chain, Navigation::Reload).unwrap();
        assert_eq!(names(&plan), vec!["list", "rows"]);
        assert_eq!(plan.replaces.as_ref(), Some(chain[1].id()));
    }

    #[test]
    fn test_link_reload_replaces_last_view() {
        let chain = vec![layout("root", true), view("home")];
        let plan = plan(RequestKind::Link, &chain, Navigation::Reload).unwrap();
        assert_eq!(names(&plan), vec!["home"]);
        assert_eq!(plan.replaces.as_ref(), Some(chain[1].id()));
    }

    #[test]
    fn test_reload_failures() {
        let chain = vec![layout("root", true), view("home")];
        let err = plan(RequestKind::Partial, &chain, Navigation::Reload).unwrap_err();
        assert_eq!(err.status().as_u16(), 500);

        let chain = vec![layout("root", true), view("a"), view("b")];
        assert!(plan(RequestKind::Partial, &chain, Navigation::Reload).is_err());

        let only_layout = vec![layout("root", true)];
        assert!(plan(RequestKind::Link, &only_layout, Navigation::Reload).is_err());
    }

    #[test]
    fn test_diff_by_identity() {
        let root = layout("root", true);
        let admin = layout("admin", false);
        let previous = vec![root.clone(), view("home")];
        let current = vec![root, admin, view("patients")];

        let plan = plan(RequestKind::Link, &current, Navigation::From(&previous)).unwrap();
        assert_eq!(names(&plan), vec!["admin", "patients"]);
        assert_eq!(plan.replaces.as_ref(), Some(previous[1].id()));
    }

    #[test]
    fn test_diff_skips_root_when_choosing_target() {
        let previous = vec![layout("old-root", true), layout("shell", false), view("a")];
        let current = vec![layout("new-root", true), view("b")];
        let plan = plan(RequestKind::Link, &current, Navigation::From(&previous)).unwrap();
        assert_eq!(names(&plan), vec!["new-root", "b"]);
        assert_eq!(plan.replaces.as_ref(), Some(previous[1].id()));
    }

    #[test]
    fn test_diff_without_target_fails() {
        let chain = vec![layout("root", true), view("home")];
        let err = plan(RequestKind::Link, &chain, Navigation::From(&chain)).unwrap_err();
        assert_eq!(err.message(), "Could not find a view to replace in the previous route");
    }
}
