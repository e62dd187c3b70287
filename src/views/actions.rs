//! Declarative client-side effects and their wire encoding.
//!
//! An action serializes to a positional argument list. Actions of the same
//! kind are grouped as `[name, args₁, args₂, …]` by the render context.

use serde_json::Value;

use crate::views::callbacks::Callback;
use crate::views::context::{ContextError, RenderContext};
use crate::views::id::Id;
use crate::views::state::StateRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOperation {
    Append,
}

impl UpdateOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateOperation::Append => "append",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Registers the root of the given state with the client.
    RegisterObservable(StateRef),
    SubscribeObservable {
        state: StateRef,
        callback: Callback,
    },
    UpdateState {
        state: StateRef,
        value: Value,
        operation: Option<UpdateOperation>,
    },
    OnClick {
        id: Id,
        callback: Callback,
    },
    Redirect {
        url: String,
        full: bool,
    },
    RefreshView {
        partial: bool,
    },
    ListenSubmit {
        form_id: Id,
        reset_after_success: bool,
    },
    BindValue {
        state: StateRef,
        to: Id,
    },
}

impl Action {
    /// Queue a client redirect in the current render context.
    pub fn redirect(url: impl Into<String>, full: bool) -> Result<(), ContextError> {
        RenderContext::emit(Action::Redirect {
            url: url.into(),
            full,
        })
    }

    /// Queue a view refresh in the current render context.
    pub fn refresh_view(partial: bool) -> Result<(), ContextError> {
        RenderContext::emit(Action::RefreshView { partial })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::RegisterObservable(_) => "registerObservable",
            Action::SubscribeObservable { .. } => "subscribeObservable",
            Action::UpdateState { .. } => "updateState",
            Action::OnClick { .. } => "onClick",
            Action::Redirect { .. } => "redirect",
            Action::RefreshView { .. } => "refreshView",
            Action::ListenSubmit { .. } => "listenSubmit",
            Action::BindValue { .. } => "bindValue",
        }
    }

    /// Positional wire arguments, without the discriminator.
    pub fn to_wire(&self) -> Value {
        let args: Vec<Value> = match self {
            Action::RegisterObservable(state) => {
                let root = state.root();
                vec![Value::from(root.key()), root.value().clone()]
            }
            Action::SubscribeObservable { state, callback } => {
                let mut args = state.address_values().to_vec();
                args.extend(callback.to_wire());
                args
            }
            Action::UpdateState {
                state,
                value,
                operation,
            } => {
                let callback = Callback::UpdateState {
                    state: state.clone(),
                    value: value.clone(),
                    operation: *operation,
                };
                callback.to_wire().into_iter().skip(1).collect()
            }
            Action::OnClick { id, callback } => {
                let mut args = vec![id.clone().into()];
                args.extend(callback.to_wire());
                args
            }
            Action::Redirect { url, full } => vec![Value::from(url.as_str()), Value::Bool(*full)],
            Action::RefreshView { partial } => vec![Value::Bool(*partial)],
            Action::ListenSubmit {
                form_id,
                reset_after_success,
            } => vec![form_id.clone().into(), Value::Bool(*reset_after_success)],
            Action::BindValue { state, to } => vec![to.clone().into(), Value::from(state.key())],
        };
        Value::Array(args)
    }

    /// Dedup key within a group. Only registrations collapse, by root key.
    fn dedup_key(&self) -> Option<&str> {
        match self {
            Action::RegisterObservable(state) => Some(state.root().key()),
            _ => None,
        }
    }
}

/// Actions of a single kind, in insertion order.
#[derive(Debug, Default)]
pub(crate) struct ActionGroup {
    actions: Vec<Action>,
}

impl ActionGroup {
    pub(crate) fn insert(&mut self, action: Action) {
        if let Some(key) = action.dedup_key() {
            if self.actions.iter().any(|a| a.dedup_key() == Some(key)) {
                return;
            }
        }
        self.actions.push(action);
    }

    pub(crate) fn len(&self) -> usize {
        self.actions.len()
    }

    pub(crate) fn to_wire(&self, name: &str) -> Value {
        let mut group = Vec::with_capacity(self.actions.len() + 1);
        group.push(Value::from(name));
        group.extend(self.actions.iter().map(Action::to_wire));
        Value::Array(group)
    }
}
