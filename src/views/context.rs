//! Render context: the per-invocation collector of emitted actions.
//!
//! # Data Flow
//! ```text
//! renderer creates RenderContext
//!     → scope()/enter() installs it as "current" for one component call
//!     → element construction / State::update call RenderContext::emit()
//!     → renderer reads actions() and addresses them by component id
//! ```
//!
//! # Design Decisions
//! - "Current" is a tokio task-local, never a process-wide global, so
//!   concurrent requests cannot observe each other's contexts
//! - Scopes nest and the previous context is restored on every exit path,
//!   including panics and dropped futures
//! - `enter()` works on any thread, which is how synchronous components
//!   running on the blocking pool see their context

use std::future::Future;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;

use crate::views::actions::{Action, ActionGroup};

tokio::task_local! {
    static CURRENT: RenderContext;
}

/// Discriminators serialized ahead of every other kind, in this order.
const PRIORITIZED: [&str; 2] = ["registerObservable", "subscribeObservable"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("no active render context")]
    NoActiveContext,
}

/// Metadata about the page being rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub path: String,
    pub title: String,
}

impl Page {
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Default)]
struct Collected {
    groups: IndexMap<&'static str, ActionGroup>,
}

/// Collector of actions emitted while one component runs.
///
/// Cheap to clone; clones share the same collector.
#[derive(Debug, Clone)]
pub struct RenderContext {
    page: Option<Arc<Page>>,
    collected: Arc<Mutex<Collected>>,
}

impl RenderContext {
    pub fn new(page: Option<Page>) -> Self {
        Self {
            page: page.map(Arc::new),
            collected: Arc::new(Mutex::new(Collected::default())),
        }
    }

    /// The context installed by the innermost active scope.
    pub fn current() -> Result<RenderContext, ContextError> {
        CURRENT
            .try_with(Clone::clone)
            .map_err(|_| ContextError::NoActiveContext)
    }

    /// Add `action` to the current context.
    pub fn emit(action: Action) -> Result<(), ContextError> {
        Self::current()?.add_action(action);
        Ok(())
    }

    /// Run `future` with this context installed as current.
    pub async fn scope<F: Future>(&self, future: F) -> F::Output {
        CURRENT.scope(self.clone(), future).await
    }

    /// Run `f` synchronously with this context installed as current.
    pub fn enter<R>(&self, f: impl FnOnce() -> R) -> R {
        CURRENT.sync_scope(self.clone(), f)
    }

    pub fn page(&self) -> Option<&Page> {
        self.page.as_deref()
    }

    pub fn add_action(&self, action: Action) {
        let name = action.name();
        self.collected
            .lock()
            .groups
            .entry(name)
            .or_default()
            .insert(action);
    }

    /// Serialized action list, or `None` when nothing was emitted.
    ///
    /// `registerObservable` and `subscribeObservable` come first, in that
    /// order; other kinds follow in the order they were first emitted.
    pub fn actions(&self) -> Option<Vec<Value>> {
        let collected = self.collected.lock();
        if collected.groups.is_empty() {
            return None;
        }

        let prioritized = PRIORITIZED
            .iter()
            .filter_map(|name| collected.groups.get(name).map(|group| (*name, group)));
        let others = collected
            .groups
            .iter()
            .filter(|(name, _)| !PRIORITIZED.contains(*name))
            .map(|(name, group)| (*name, group));

        Some(
            prioritized
                .chain(others)
                .map(|(name, group)| group.to_wire(name))
                .collect(),
        )
    }

    /// Number of emitted actions per discriminator.
    pub fn counts(&self) -> Vec<(&'static str, usize)> {
        self.collected
            .lock()
            .groups
            .iter()
            .map(|(name, group)| (*name, group.len()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::callbacks::Callback;
    use crate::views::id::Id;
    use crate::views::state::State;
    use serde_json::json;

    #[test]
    fn test_page_visible_inside_scope() {
        let ctx = RenderContext::new(Some(Page::new("/patients", "Patients")));
        let page = ctx.enter(|| RenderContext::current().unwrap().page().cloned());
        assert_eq!(
            page,
            Some(Page {
                path: "/patients".into(),
                title: "Patients".into(),
            })
        );
    }

    #[test]
    fn test_no_active_context() {
        assert_eq!(RenderContext::current().unwrap_err(), ContextError::NoActiveContext);
        assert!(RenderContext::emit(Action::RefreshView { partial: false }).is_err());
    }

    #[test]
    fn test_empty_context_serializes_to_none() {
        let ctx = RenderContext::new(None);
        assert_eq!(ctx.actions(), None);
    }

    #[test]
    fn test_nested_scopes_restore_previous() {
        let outer = RenderContext::new(None);
        let inner = RenderContext::new(None);

        outer.enter(|| {
            RenderContext::emit(Action::RefreshView { partial: false }).unwrap();
            inner.enter(|| {
                RenderContext::emit(Action::RefreshView { partial: true }).unwrap();
            });
            RenderContext::emit(Action::Redirect {
                url: "/next".into(),
                full: true,
            })
            .unwrap();
        });

        assert_eq!(
            outer.actions(),
            Some(vec![
                json!(["refreshView", [false]]),
                json!(["redirect", ["/next", true]]),
            ])
        );
        assert_eq!(inner.actions(), Some(vec![json!(["refreshView", [true]])]));
        assert!(RenderContext::current().is_err());
    }

    #[test]
    fn test_prioritized_kinds_come_first() {
        let ctx = RenderContext::new(None);
        let open = State::new("open", true).unwrap();

        ctx.add_action(Action::Redirect {
            url: "/".into(),
            full: false,
        });
        ctx.add_action(Action::SubscribeObservable {
            state: open.snapshot().clone(),
            callback: Callback::ToggleShow { id: Id::new("el_1") },
        });
        ctx.add_action(Action::RegisterObservable(open.snapshot().clone()));

        let actions = ctx.actions().unwrap();
        let names: Vec<&str> = actions.iter().map(|group| group[0].as_str().unwrap()).collect();
        assert_eq!(names, ["registerObservable", "subscribeObservable", "redirect"]);
    }

    #[test]
    fn test_register_dedups_by_root_key() {
        let ctx = RenderContext::new(None);
        let a = State::new("a", 1).unwrap();
        let b = State::new("b", 2).unwrap();

        ctx.add_action(Action::RegisterObservable(a.snapshot().clone()));
        ctx.add_action(Action::RegisterObservable(b.snapshot().clone()));
        ctx.add_action(Action::RegisterObservable(a.snapshot().clone()));

        assert_eq!(
            ctx.actions(),
            Some(vec![json!([
                "registerObservable",
                [a.key(), 1],
                [b.key(), 2]
            ])])
        );
    }

    #[tokio::test]
    async fn test_async_scope() {
        let ctx = RenderContext::new(Some(Page::new("/", "Home")));
        ctx.scope(async {
            tokio::task::yield_now().await;
            let current = RenderContext::current().unwrap();
            assert_eq!(current.page().unwrap().path, "/");
            RenderContext::emit(Action::RefreshView { partial: false }).unwrap();
        })
        .await;

        assert_eq!(ctx.counts(), vec![("refreshView", 1)]);
        assert!(RenderContext::current().is_err());
    }
}
