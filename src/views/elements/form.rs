//! Form controls and their client bindings.
//!
//! A form with an id listens for submission on the client. Inputs bound to a
//! [`State`] mirror their value into it.

use serde::Serialize;

use super::{Element, ElementBuilder, ElementError};
use crate::views::actions::Action;
use crate::views::callbacks::Callback;
use crate::views::context::RenderContext;
use crate::views::id::Id;
use crate::views::state::{value_to_text, State, StateRef, When};

/// Input types whose value cannot be mirrored through change events.
const UNBINDABLE_INPUT_TYPES: [&str; 5] = ["checkbox", "radio", "submit", "reset", "button"];

/// Initial value of a form's submission state.
pub const FORM_STATE_READY: &str = "ready";

pub fn form() -> FormBuilder {
    FormBuilder {
        element: ElementBuilder::new("form").attr("method", "post"),
        errors: None,
        reset_after_success: false,
        loading_class: None,
        error_class: None,
    }
}

pub fn input() -> InputBuilder {
    InputBuilder {
        element: ElementBuilder::void("input"),
        input_type: "text".to_string(),
        bound: None,
    }
}

pub fn checkbox(checked: bool) -> InputBuilder {
    let mut builder = input().input_type("checkbox");
    builder.element = builder.element.flag("checked", checked);
    builder
}

pub fn button() -> ElementBuilder {
    ElementBuilder::new("button")
}

pub fn label(for_id: impl Into<Id>) -> ElementBuilder {
    ElementBuilder::new("label").attr("for", for_id.into().to_string())
}

#[derive(Debug, Clone)]
pub struct FormBuilder {
    element: ElementBuilder,
    errors: Option<StateRef>,
    reset_after_success: bool,
    loading_class: Option<String>,
    error_class: Option<String>,
}

impl FormBuilder {
    /// Apply any element-level setting (classes, children, attributes).
    pub fn with(mut self, f: impl FnOnce(ElementBuilder) -> ElementBuilder) -> Self {
        self.element = f(self.element);
        self
    }

    pub fn id(self, id: impl Into<Id>) -> Self {
        self.with(|e| e.id(id))
    }

    pub fn method(self, method: &str) -> Self {
        self.with(|e| e.attr("method", method))
    }

    pub fn action(self, url: &str) -> Self {
        self.with(|e| e.attr("action", url))
    }

    pub fn child(self, child: impl Into<super::Node>) -> Self {
        self.with(|e| e.child(child))
    }

    /// State receiving validation errors from the action endpoint.
    pub fn errors<T>(mut self, errors: &State<T>) -> Self {
        self.errors = Some(errors.snapshot().clone());
        self
    }

    pub fn reset_after_success(mut self, reset: bool) -> Self {
        self.reset_after_success = reset;
        self
    }

    pub fn loading_class(mut self, class: impl Into<String>) -> Self {
        self.loading_class = Some(class.into());
        self
    }

    pub fn error_class(mut self, class: impl Into<String>) -> Self {
        self.error_class = Some(class.into());
        self
    }

    pub fn build(mut self) -> Result<Element, ElementError> {
        if self.errors.is_some() {
            self.element.ensure_id();
        }
        let Some(id) = self.element.current_id().cloned() else {
            return self.element.build();
        };

        let ctx = RenderContext::current()?;
        let element = self.element.build()?;

        ctx.add_action(Action::ListenSubmit {
            form_id: id.clone(),
            reset_after_success: self.reset_after_success,
        });

        if self.loading_class.is_some() || self.error_class.is_some() {
            let key = format!("{}_form_state", id);
            let form_state = State::with_key(key.clone(), key, FORM_STATE_READY)?;
            ctx.add_action(Action::RegisterObservable(form_state.snapshot().clone()));
            ctx.add_action(Action::SubscribeObservable {
                state: form_state.snapshot().clone(),
                callback: Callback::UpdateFormStateClass {
                    form_id: id,
                    loading_class: self.loading_class,
                    error_class: self.error_class,
                },
            });
        }

        if let Some(errors) = self.errors {
            ctx.add_action(Action::RegisterObservable(errors));
        }

        Ok(element)
    }
}

#[derive(Debug, Clone)]
pub struct InputBuilder {
    element: ElementBuilder,
    input_type: String,
    bound: Option<StateRef>,
}

impl InputBuilder {
    pub fn with(mut self, f: impl FnOnce(ElementBuilder) -> ElementBuilder) -> Self {
        self.element = f(self.element);
        self
    }

    pub fn id(self, id: impl Into<Id>) -> Self {
        self.with(|e| e.id(id))
    }

    pub fn name(self, name: &str) -> Self {
        self.with(|e| e.attr("name", name))
    }

    pub fn input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = input_type.into();
        self
    }

    pub fn value(self, value: &str) -> Self {
        self.with(|e| e.attr("value", value))
    }

    /// Render the state's current value and mirror edits back into it.
    pub fn bind<T: Serialize + Clone>(mut self, state: &State<T>) -> Self {
        let text = value_to_text(state.snapshot().value());
        self.element = self.element.attr("value", text);
        self.bound = Some(state.snapshot().clone());
        self
    }

    pub fn placeholder(self, text: &str) -> Self {
        self.with(|e| e.attr("placeholder", text))
    }

    pub fn required(self, required: bool) -> Self {
        self.with(|e| e.flag("required", required))
    }

    pub fn disabled(self, disabled: bool) -> Self {
        self.with(|e| e.flag("disabled", disabled))
    }

    pub fn disabled_when(self, when: When) -> Self {
        self.with(|e| e.reactive_attr("disabled", when))
    }

    pub fn build(mut self) -> Result<Element, ElementError> {
        if !self.element.has_attribute("type") {
            self.element = self.element.attr("type", self.input_type.clone());
        }

        let Some(state) = self.bound else {
            return self.element.build();
        };
        if UNBINDABLE_INPUT_TYPES.contains(&self.input_type.as_str()) {
            return Err(ElementError::UnbindableInput(self.input_type));
        }

        let id = self.element.ensure_id();
        let ctx = RenderContext::current()?;
        let element = self.element.build()?;
        ctx.add_action(Action::RegisterObservable(state.clone()));
        ctx.add_action(Action::BindValue { state, to: id });
        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::elements::Node;
    use serde_json::json;

    #[test]
    fn test_form_without_id_is_plain() {
        let el = form().child("x").build().unwrap();
        assert_eq!(el.render(), r#"<form method="post">x</form>"#);
    }

    #[test]
    fn test_form_with_errors_listens_and_tracks_state() {
        let ctx = RenderContext::new(None);
        let errors = State::new("errors", json!({})).unwrap();

        let el = ctx
            .enter(|| {
                form()
                    .errors(&errors)
                    .reset_after_success(true)
                    .loading_class("busy")
                    .build()
            })
            .unwrap();

        let id = el.id().unwrap().to_string();
        let state_key = format!("{}_form_state", id);
        assert_eq!(
            ctx.actions(),
            Some(vec![
                json!([
                    "registerObservable",
                    [state_key, "ready"],
                    [errors.key(), {}]
                ]),
                json!([
                    "subscribeObservable",
                    [state_key, null, "updateFormStateClass", id, "busy", null]
                ]),
                json!(["listenSubmit", [id, true]]),
            ])
        );
    }

    #[test]
    fn test_bound_input() {
        let ctx = RenderContext::new(None);
        let email = State::new("email", "a@b.c").unwrap();
        let el = ctx.enter(|| input().name("email").bind(&email).build()).unwrap();

        let id = el.id().unwrap().to_string();
        assert_eq!(
            el.render(),
            format!(r#"<input name="email" value="a@b.c" type="text" id="{}">"#, id)
        );
        assert_eq!(
            ctx.actions().unwrap()[1],
            json!(["bindValue", [id, email.key()]])
        );
    }

    #[test]
    fn test_checkbox_cannot_bind_value() {
        let ctx = RenderContext::new(None);
        let done = State::new("done", true).unwrap();
        let err = ctx
            .enter(|| checkbox(true).bind(&done).build())
            .unwrap_err();
        assert!(matches!(err, ElementError::UnbindableInput(t) if t == "checkbox"));
        assert_eq!(ctx.actions(), None);
    }

    #[test]
    fn test_label_and_checkbox_render() {
        let label: Node = label("agree").child("I agree").build().unwrap().into();
        assert_eq!(label.render(), r#"<label for="agree">I agree</label>"#);
        assert_eq!(
            checkbox(false).id("agree").build().unwrap().render(),
            r#"<input type="checkbox" id="agree">"#
        );
    }
}
