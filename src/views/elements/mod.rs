//! Renderable element tree.
//!
//! # Responsibilities
//! - One parametrized element type shared by every HTML tag
//! - Register reactive bindings (class toggles, visibility, click handlers,
//!   reactive attributes) into the current render context at build time
//! - Render markup with escaped text and attribute values
//!
//! # Design Decisions
//! - Construction is the only side effect: `build()` may emit actions,
//!   `render()` is pure and needs no context
//! - Elements without bindings never touch the render context, so static
//!   markup (error pages, layouts without state) can be built anywhere
//! - Tag-specific constructors are thin factories in [`tags`] and [`form`]

pub mod for_each;
pub mod form;
pub mod tags;

use indexmap::IndexMap;
use thiserror::Error;

use crate::views::actions::Action;
use crate::views::callbacks::Callback;
use crate::views::context::{ContextError, RenderContext};
use crate::views::id::Id;
use crate::views::state::{StateError, When};

pub use for_each::{ForEach, Item};
pub use form::{button, checkbox, form, input, label, FormBuilder, InputBuilder};
pub use tags::*;

/// Prefix of generated element ids.
pub const ELEMENT_ID_PREFIX: &str = "el";

const DOCTYPE: &str = "<!DOCTYPE html>\n";

#[derive(Debug, Error)]
pub enum ElementError {
    #[error("void tag '{0}' cannot have children")]
    VoidChildren(String),

    #[error("cannot bind a value to an input of type '{0}'")]
    UnbindableInput(String),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    State(#[from] StateError),
}

/// A node in the renderable tree.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Box<Element>),
    /// Text content, escaped on render.
    Text(String),
    /// Trusted markup, rendered verbatim.
    Raw(String),
    /// Structural wrapper that renders only its children.
    Pseudo {
        tag: &'static str,
        children: Vec<Node>,
    },
    Empty,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn raw(markup: impl Into<String>) -> Self {
        Node::Raw(markup.into())
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    /// Append `child` as the last child of this node.
    ///
    /// Leaf nodes are turned into a wrapper holding both.
    pub fn append_child(&mut self, child: Node) {
        match self {
            Node::Element(element) => element.children.push(child),
            Node::Pseudo { children, .. } => children.push(child),
            Node::Empty => *self = child,
            leaf => {
                let previous = std::mem::replace(leaf, Node::Empty);
                *leaf = Node::Pseudo {
                    tag: "group",
                    children: vec![previous, child],
                };
            }
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Node::Element(element) => element.write_to(out),
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Raw(markup) => out.push_str(markup),
            Node::Pseudo { children, .. } => {
                for child in children {
                    child.write_to(out);
                }
            }
            Node::Empty => {}
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(Box::new(element))
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(node: Option<T>) -> Self {
        node.map(Into::into).unwrap_or(Node::Empty)
    }
}

impl From<Vec<Node>> for Node {
    fn from(children: Vec<Node>) -> Self {
        Node::Pseudo {
            tag: "group",
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    /// Rendered as a bare attribute name when true, omitted when false.
    Flag(bool),
}

/// A built HTML element.
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    void: bool,
    id: Option<Id>,
    attributes: IndexMap<String, AttrValue>,
    children: Vec<Node>,
    doctype: bool,
}

impl Element {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        if self.doctype {
            out.push_str(DOCTYPE);
        }
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            match value {
                AttrValue::Text(text) if !text.is_empty() => {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(text));
                    out.push('"');
                }
                AttrValue::Flag(true) => {
                    out.push(' ');
                    out.push_str(name);
                }
                _ => {}
            }
        }
        out.push('>');
        if self.void {
            return;
        }
        for child in &self.children {
            child.write_to(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

#[derive(Debug, Clone)]
enum AttrSpec {
    Value(AttrValue),
    When(When),
}

#[derive(Debug, Clone)]
enum Visibility {
    Fixed(bool),
    When(When),
}

/// Builder shared by every tag constructor.
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    tag: String,
    void: bool,
    id: Option<Id>,
    classes: Vec<String>,
    toggle_class: Option<When>,
    show: Option<Visibility>,
    on_click: Option<Callback>,
    attributes: IndexMap<String, AttrSpec>,
    children: Vec<Node>,
    doctype: bool,
}

impl ElementBuilder {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            void: false,
            id: None,
            classes: Vec::new(),
            toggle_class: None,
            show: None,
            on_click: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
            doctype: false,
        }
    }

    /// A tag without closing tag or children (`<br>`, `<input>`, ...).
    pub fn void(tag: impl Into<String>) -> Self {
        Self {
            void: true,
            ..Self::new(tag)
        }
    }

    pub fn id(mut self, id: impl Into<Id>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Whitespace separated class list.
    pub fn class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    pub fn classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes
            .extend(classes.into_iter().map(|c| c.into().trim().to_string()));
        self
    }

    /// Toggle the class named by `when.result()` as the condition changes.
    pub fn toggle_class(mut self, when: When) -> Self {
        self.toggle_class = Some(when);
        self
    }

    /// Render with `display: none` when false.
    pub fn show(mut self, visible: bool) -> Self {
        self.show = Some(Visibility::Fixed(visible));
        self
    }

    /// Visibility tracking a live condition.
    pub fn show_when(mut self, when: When) -> Self {
        self.show = Some(Visibility::When(when));
        self
    }

    pub fn on_click(mut self, callback: Callback) -> Self {
        self.on_click = Some(callback);
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(name.into(), AttrSpec::Value(AttrValue::Text(value.into())));
        self
    }

    pub fn flag(mut self, name: impl Into<String>, on: bool) -> Self {
        self.attributes
            .insert(name.into(), AttrSpec::Value(AttrValue::Flag(on)));
        self
    }

    /// A boolean attribute (`disabled`, `checked`, ...) that follows a condition.
    pub fn reactive_attr(mut self, name: impl Into<String>, when: When) -> Self {
        self.attributes.insert(name.into(), AttrSpec::When(when));
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        push_flattened(&mut self.children, child.into());
        self
    }

    pub fn children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        for child in children {
            push_flattened(&mut self.children, child.into());
        }
        self
    }

    /// Append trusted markup.
    pub fn raw(mut self, markup: impl Into<String>) -> Self {
        self.children.push(Node::Raw(markup.into()));
        self
    }

    /// Prefix the rendered element with `<!DOCTYPE html>`.
    pub fn doctype(mut self) -> Self {
        self.doctype = true;
        self
    }

    pub(crate) fn current_id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    pub(crate) fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// The element id, generated when none was given.
    pub(crate) fn ensure_id(&mut self) -> Id {
        self.id
            .get_or_insert_with(|| Id::random(Some(ELEMENT_ID_PREFIX)))
            .clone()
    }

    fn has_bindings(&self) -> bool {
        self.toggle_class.is_some()
            || matches!(self.show, Some(Visibility::When(_)))
            || self.on_click.is_some()
            || self
                .attributes
                .values()
                .any(|spec| matches!(spec, AttrSpec::When(_)))
    }

    /// Finish the element, emitting its bindings into the current context.
    pub fn build(mut self) -> Result<Element, ElementError> {
        if self.void && self.children.iter().any(|c| !matches!(c, Node::Empty)) {
            return Err(ElementError::VoidChildren(self.tag));
        }

        let id = if self.has_bindings() {
            Some(self.ensure_id())
        } else {
            self.id.clone()
        };
        let ctx = if id.is_some() && self.has_bindings() {
            Some(RenderContext::current()?)
        } else {
            None
        };

        let mut classes = self.classes;
        if let (Some(when), Some(ctx), Some(id)) = (&self.toggle_class, &ctx, &id) {
            if let Some(class) = when.result() {
                if when.evaluate() {
                    if !classes.iter().any(|c| c == class) {
                        classes.push(class.to_string());
                    }
                } else {
                    classes.retain(|c| c != class);
                }
            }
            subscribe(
                ctx,
                when,
                Callback::ToggleClass {
                    id: id.clone(),
                    when: when.clone(),
                },
            );
        }

        let mut hidden = false;
        match (&self.show, &ctx, &id) {
            (Some(Visibility::Fixed(visible)), _, _) => hidden = !visible,
            (Some(Visibility::When(when)), Some(ctx), Some(id)) => {
                hidden = !when.evaluate();
                subscribe(ctx, when, Callback::ToggleShow { id: id.clone() });
            }
            _ => {}
        }

        if let (Some(callback), Some(ctx), Some(id)) = (self.on_click.take(), &ctx, &id) {
            ctx.add_action(Action::OnClick {
                id: id.clone(),
                callback,
            });
        }

        let mut attributes = IndexMap::with_capacity(self.attributes.len() + 3);
        for (name, spec) in self.attributes {
            let value = match spec {
                AttrSpec::Value(value) => value,
                AttrSpec::When(when) => {
                    if let (Some(ctx), Some(id)) = (&ctx, &id) {
                        subscribe(
                            ctx,
                            &when,
                            Callback::ReactiveAttribute {
                                id: id.clone(),
                                attribute: name.clone(),
                                when: when.clone(),
                            },
                        );
                    }
                    AttrValue::Flag(when.evaluate())
                }
            };
            attributes.insert(name, value);
        }

        if let Some(id) = &id {
            attributes.insert("id".to_string(), AttrValue::Text(id.to_string()));
        }
        if !classes.is_empty() {
            attributes.insert("class".to_string(), AttrValue::Text(classes.join(" ")));
        }
        if hidden {
            let style = match attributes.get("style") {
                Some(AttrValue::Text(existing)) if !existing.is_empty() => {
                    format!("{} display: none;", existing.trim_end())
                }
                _ => "display: none;".to_string(),
            };
            attributes.insert("style".to_string(), AttrValue::Text(style));
        }

        Ok(Element {
            tag: self.tag,
            void: self.void,
            id,
            attributes,
            children: self.children,
            doctype: self.doctype,
        })
    }
}

/// Register the condition's state and subscribe `callback` to it.
fn subscribe(ctx: &RenderContext, when: &When, callback: Callback) {
    ctx.add_action(Action::RegisterObservable(when.state().clone()));
    ctx.add_action(Action::SubscribeObservable {
        state: when.state().clone(),
        callback,
    });
}

fn push_flattened(children: &mut Vec<Node>, node: Node) {
    match node {
        Node::Empty => {}
        Node::Pseudo { tag: "group", children: nested } => {
            for child in nested {
                push_flattened(children, child);
            }
        }
        other => children.push(other),
    }
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
