//! Repeat a child per item of a state collection.
//!
//! Bound to a container id, the collection is also registered with the
//! client together with an item template, so items appended later are
//! rendered client-side. Template placeholders have the form
//! `{{value.<field>}}`.

use serde_json::Value;

use super::{Element, ElementError, Node};
use crate::views::actions::Action;
use crate::views::callbacks::Callback;
use crate::views::context::RenderContext;
use crate::views::id::Id;
use crate::views::state::{value_to_text, State, StateError, StateRef};

/// One item handed to a per-item factory.
#[derive(Debug, Clone, Copy)]
pub enum Item<'a> {
    Value(&'a Value),
    /// Rendering the client template; fields resolve to placeholders.
    Template,
}

impl Item<'_> {
    /// Text of `name` on an object item, or its placeholder.
    pub fn field(&self, name: &str) -> String {
        match self {
            Item::Value(value) => value.get(name).map(value_to_text).unwrap_or_default(),
            Item::Template => format!("{{{{value.{}}}}}", name),
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Item::Value(value) => Some(value),
            Item::Template => None,
        }
    }
}

type Factory<'f> = Box<dyn Fn(Item<'_>) -> Result<Element, ElementError> + 'f>;

enum Template<'f> {
    Repeat(Element),
    Factory(Factory<'f>),
}

pub struct ForEach<'f> {
    items: StateRef,
    template: Template<'f>,
    parent: Option<Id>,
}

impl<'f> ForEach<'f> {
    /// Build one element per item with `factory`.
    pub fn each<T>(
        items: &State<T>,
        factory: impl Fn(Item<'_>) -> Result<Element, ElementError> + 'f,
    ) -> Self {
        Self {
            items: items.snapshot().clone(),
            template: Template::Factory(Box::new(factory)),
            parent: None,
        }
    }

    /// Repeat a fixed element once per item.
    pub fn repeat<T>(items: &State<T>, element: Element) -> Self {
        Self {
            items: items.snapshot().clone(),
            template: Template::Repeat(element),
            parent: None,
        }
    }

    /// Keep the container `parent` in sync with items added client-side.
    pub fn bind_to(mut self, parent: impl Into<Id>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn build(self) -> Result<Node, ElementError> {
        let empty = Vec::new();
        let items = match self.items.value() {
            Value::Array(items) => items,
            Value::Null => &empty,
            _ => return Err(StateError::NotASequence(self.items.key().to_string()).into()),
        };

        let mut children = Vec::with_capacity(items.len());
        for item in items {
            let element = match &self.template {
                Template::Repeat(element) => element.clone(),
                Template::Factory(factory) => factory(Item::Value(item))?,
            };
            children.push(Node::from(element));
        }

        if let Some(parent_id) = self.parent {
            let ctx = RenderContext::current()?;
            let template = match &self.template {
                Template::Repeat(element) => element.render(),
                // Template markup must not leak bindings into the page's actions.
                Template::Factory(factory) => RenderContext::new(None)
                    .enter(|| factory(Item::Template))?
                    .render(),
            };
            ctx.add_action(Action::RegisterObservable(self.items.clone()));
            ctx.add_action(Action::SubscribeObservable {
                state: self.items,
                callback: Callback::InsertElements {
                    template,
                    parent_id,
                },
            });
        }

        Ok(Node::Pseudo {
            tag: "for-each",
            children,
        })
    }
}

impl std::fmt::Debug for ForEach<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForEach")
            .field("items", &self.items.key())
            .field("parent", &self.parent)
            .finish()
    }
}
