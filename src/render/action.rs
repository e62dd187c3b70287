//! Action rendering for mutating requests.
//!
//! # Design Decisions
//! - A routing error raised by the action carries the actions it queued
//!   before failing, so the client still receives them
//! - An explicit response returned by the action bypasses the envelope

use axum::http::StatusCode;
use axum::response::Response;

use crate::http::error::RoutingError;
use crate::http::request::RequestContext;
use crate::http::response;
use crate::render::args::ComponentArgs;
use crate::render::invoke::invoke;
use crate::render::{record_emitted, ActionEnvelope, ActionsMap};
use crate::routing::{ActionOutcome, MatchedRoute, Output};
use crate::security::auth::AuthGuard;
use crate::views::RenderContext;

pub async fn render_action(
    matched: &MatchedRoute,
    ctx: &mut RequestContext,
    auth: &AuthGuard,
) -> Result<Response, RoutingError> {
    let action = matched
        .route
        .action_component()
        .ok_or_else(RoutingError::method_not_allowed)?;

    let render_ctx = RenderContext::new(Some(ctx.page().clone()));
    let args = ComponentArgs::bind(action, ctx, auth, None, &matched.args).await?;
    let result = invoke(action, args, &render_ctx).await;
    record_emitted(&render_ctx.counts());

    let mut actions = ActionsMap::new();
    actions.insert(action.id().to_string(), render_ctx.actions());

    match result {
        Ok(Output::Action(ActionOutcome::Done)) => Ok(response::json(
            StatusCode::OK,
            &ActionEnvelope { actions: &actions },
            Some(ctx.head().cookies()),
        )),
        Ok(Output::Action(ActionOutcome::Respond(response))) => Ok(response),
        Ok(Output::View(_)) => Err(RoutingError::internal(format!(
            "action '{}' rendered a view",
            action.name()
        ))),
        Err(err) => Err(err.with_actions(actions)),
    }
}
