//! View rendering: runs the planned components leaf first and assembles
//! either a full page or a JSON envelope.

use axum::http::StatusCode;
use axum::response::Response;

use crate::http::error::RoutingError;
use crate::http::request::RequestContext;
use crate::http::response;
use crate::render::args::ComponentArgs;
use crate::render::invoke::invoke;
use crate::render::strategy::{self, Navigation};
use crate::render::{record_emitted, ActionsMap, ViewEnvelope};
use crate::routing::{MatchedRoute, Output};
use crate::security::auth::AuthGuard;
use crate::views::elements::{script, wrap_fragment};
use crate::views::{Id, Node, RenderContext};

/// Output of the render loop, before response assembly.
#[derive(Debug)]
pub struct RenderedView {
    pub replaces: Option<Id>,
    pub view: Node,
    pub actions: ActionsMap,
}

pub async fn render_view(
    matched: &MatchedRoute,
    navigation: Navigation<'_>,
    ctx: &mut RequestContext,
    auth: &AuthGuard,
) -> Result<RenderedView, RoutingError> {
    let plan = strategy::plan(ctx.head().kind(), matched.route.views(), navigation)?;

    let mut actions = ActionsMap::new();
    let mut children: Option<Node> = None;

    for component in plan.components.iter().rev() {
        let render_ctx = RenderContext::new(Some(ctx.page().clone()));
        let args =
            ComponentArgs::bind(component, ctx, auth, children.take(), &matched.args).await?;

        let node = match invoke(component, args, &render_ctx).await? {
            Output::View(node) => node,
            Output::Action(_) => {
                return Err(RoutingError::internal(format!(
                    "component '{}' did not render a view",
                    component.name()
                )))
            }
        };

        record_emitted(&render_ctx.counts());
        actions.insert(component.id().to_string(), render_ctx.actions());

        children = Some(if component.is_root() {
            node
        } else {
            wrap_fragment(component.id(), node)?.into()
        });
    }

    let view = children.ok_or_else(|| RoutingError::internal("Rendering resulted in an empty view"))?;
    Ok(RenderedView {
        replaces: plan.replaces,
        view,
        actions,
    })
}

impl RenderedView {
    /// JSON envelope for framework requests, full page otherwise.
    pub fn into_response(
        self,
        ctx: &RequestContext,
        client_runtime: &str,
    ) -> Result<Response, RoutingError> {
        let cookies = ctx.head().cookies();

        if ctx.head().is_framework() {
            let markup = self.view.render();
            let envelope = ViewEnvelope {
                replaces: self.replaces.as_ref().map(Id::as_str),
                view: &markup,
                actions: &self.actions,
            };
            return Ok(response::json(StatusCode::OK, &envelope, Some(cookies)));
        }

        let mut page = self.view;
        page.append_child(runtime_script(client_runtime, &self.actions)?);
        Ok(response::html(StatusCode::OK, page.render(), Some(cookies)))
    }
}

/// `<script>{runtime}.run({actions});</script>`
fn runtime_script(client_runtime: &str, actions: &ActionsMap) -> Result<Node, RoutingError> {
    let payload = serde_json::to_string(actions)
        .map_err(|err| RoutingError::internal(err.to_string()))?
        .replace("</", "<\\/");
    let element = script()
        .raw(format!("{}.run({});", client_runtime, payload))
        .build()?;
    Ok(element.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_runtime_script_escapes_closing_tags() {
        let mut actions = ActionsMap::new();
        actions.insert("v_a".into(), Some(vec![json!(["consoleLog", ["</script>"]])]));
        let node = runtime_script("window.__trellis", &actions).unwrap();
        assert_eq!(
            node.render(),
            r#"<script>window.__trellis.run({"v_a":[["consoleLog",["<\/script>"]]]});</script>"#
        );
    }

    #[test]
    fn test_runtime_script_with_no_actions() {
        let mut actions = ActionsMap::new();
        actions.insert("v_a".into(), None);
        let node = runtime_script("app", &actions).unwrap();
        assert_eq!(node.render(), r#"<script>app.run({"v_a":null});</script>"#);
    }
}
