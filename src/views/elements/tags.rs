//! Tag constructors.
//!
//! Each function is a thin factory over [`ElementBuilder`]; form controls
//! live in [`super::form`].

use super::{Element, ElementBuilder, ElementError, Node};
use crate::views::id::Id;

macro_rules! tags {
    ($($name:ident),* $(,)?) => {
        $(
            pub fn $name() -> ElementBuilder {
                ElementBuilder::new(stringify!($name))
            }
        )*
    };
}

macro_rules! void_tags {
    ($($name:ident),* $(,)?) => {
        $(
            pub fn $name() -> ElementBuilder {
                ElementBuilder::void(stringify!($name))
            }
        )*
    };
}

tags!(
    html, head, title, body, script, style, div, span, p, a, h1, h2, h3, h4, ul, ol, li, nav,
    header, footer, section, article, aside, strong, em, small, pre, code, table, thead, tbody,
    tr, th, td,
);

void_tags!(br, hr, img, meta, link);

/// `<main>`. Named to avoid shadowing the entry point in glob imports.
pub fn main_() -> ElementBuilder {
    ElementBuilder::new("main")
}

/// Addressable wrapper the client replaces by id.
pub fn fragment(id: impl Into<Id>) -> ElementBuilder {
    ElementBuilder::new("fragment").id(id)
}

/// Wrap an already rendered subtree in a fragment addressed by `id`.
pub fn wrap_fragment(id: &Id, inner: Node) -> Result<Element, ElementError> {
    fragment(id).child(inner).build()
}
