//! Client-side callbacks triggered by actions.
//!
//! Callbacks are carried inside `subscribeObservable` and `onClick` actions.
//! Their wire form starts with the callback name.

use serde_json::Value;

use crate::views::actions::UpdateOperation;
use crate::views::id::Id;
use crate::views::state::{StateRef, When};

#[derive(Debug, Clone, PartialEq)]
pub enum Callback {
    UpdateState {
        state: StateRef,
        value: Value,
        operation: Option<UpdateOperation>,
    },
    ToggleShow {
        id: Id,
    },
    ToggleClass {
        id: Id,
        when: When,
    },
    PartialFetch {
        data: Value,
        url: Option<String>,
    },
    /// `template` is rendered markup with `{{value.<field>}}` placeholders.
    InsertElements {
        template: String,
        parent_id: Id,
    },
    ReactiveAttribute {
        id: Id,
        attribute: String,
        when: When,
    },
    ConsoleLog {
        message: String,
    },
    UpdateFormStateClass {
        form_id: Id,
        loading_class: Option<String>,
        error_class: Option<String>,
    },
}

impl Callback {
    pub fn update_state<T>(
        state: &crate::views::state::State<T>,
        value: impl Into<Value>,
    ) -> Self {
        Callback::UpdateState {
            state: state.snapshot().clone(),
            value: value.into(),
            operation: None,
        }
    }

    pub fn partial_fetch(data: Value, url: Option<String>) -> Self {
        Callback::PartialFetch { data, url }
    }

    pub fn console_log(message: impl Into<String>) -> Self {
        Callback::ConsoleLog {
            message: message.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Callback::UpdateState { .. } => "updateState",
            Callback::ToggleShow { .. } => "toggleShow",
            Callback::ToggleClass { .. } => "toggleClass",
            Callback::PartialFetch { .. } => "partialFetch",
            Callback::InsertElements { .. } => "insertElements",
            Callback::ReactiveAttribute { .. } => "reactiveAttribute",
            Callback::ConsoleLog { .. } => "consoleLog",
            Callback::UpdateFormStateClass { .. } => "updateFormStateClass",
        }
    }

    /// Positional wire arguments, name first.
    pub fn to_wire(&self) -> Vec<Value> {
        let mut args = vec![Value::from(self.name())];
        match self {
            Callback::UpdateState {
                state,
                value,
                operation,
            } => {
                args.extend(state.address_values());
                args.push(value.clone());
                args.push(operation.map(|op| Value::from(op.as_str())).unwrap_or(Value::Null));
            }
            Callback::ToggleShow { id } => args.push(id.clone().into()),
            Callback::ToggleClass { id, when } => {
                args.push(id.clone().into());
                args.extend(when.op_values());
                args.push(when.result().map(Value::from).unwrap_or(Value::Null));
            }
            Callback::PartialFetch { data, url } => {
                args.push(data.clone());
                args.push(url.clone().map(Value::from).unwrap_or(Value::Null));
            }
            Callback::InsertElements {
                template,
                parent_id,
            } => {
                args.push(Value::from(template.as_str()));
                args.push(parent_id.clone().into());
            }
            Callback::ReactiveAttribute {
                id,
                attribute,
                when,
            } => {
                args.push(id.clone().into());
                args.push(Value::from(attribute.as_str()));
                args.push(Value::from(when.kind_name()));
            }
            Callback::ConsoleLog { message } => args.push(Value::from(message.as_str())),
            Callback::UpdateFormStateClass {
                form_id,
                loading_class,
                error_class,
            } => {
                args.push(form_id.clone().into());
                args.push(loading_class.clone().map(Value::from).unwrap_or(Value::Null));
                args.push(error_class.clone().map(Value::from).unwrap_or(Value::Null));
            }
        }
        args
    }
}
