//! Render pipeline: from a matched route to a response.
//!
//! # Data Flow
//! ```text
//! MatchedRoute + RequestContext
//!     → strategy.rs (which components to render, what they replace)
//!     → args.rs (bind declared parameters)
//!     → invoke.rs (one RenderContext per component, blocking or async)
//!     → view.rs  → full HTML page or JSON envelope
//!     → action.rs → actions envelope, explicit response, or error + actions
//! ```
//!
//! # Design Decisions
//! - Components run strictly one after another, leaf first, so each outer
//!   component receives its inner component's output as `children`
//! - Collected actions are keyed by component id in leaf-first order

pub mod action;
pub mod args;
pub mod invoke;
pub mod strategy;
pub mod view;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

pub use action::render_action;
pub use args::{ComponentArgs, ComponentArgsBuilder};
pub use strategy::{plan, RenderPlan};
pub use view::{render_view, RenderedView};

/// Component id → that component's serialized actions (`None` when it
/// emitted nothing).
pub type ActionsMap = IndexMap<String, Option<Vec<Value>>>;

/// Body of a successful framework view response.
#[derive(Debug, Serialize)]
pub struct ViewEnvelope<'a> {
    pub replaces: Option<&'a str>,
    pub view: &'a str,
    pub actions: &'a ActionsMap,
}

/// Body of an action response, or of a framework error with actions.
#[derive(Debug, Serialize)]
pub struct ActionEnvelope<'a> {
    pub actions: &'a ActionsMap,
}

/// Emitted-action counter, one increment per action.
pub(crate) fn record_emitted(counts: &[(&'static str, usize)]) {
    for (kind, count) in counts {
        crate::observability::metrics::record_emitted_actions(kind, *count);
    }
}
