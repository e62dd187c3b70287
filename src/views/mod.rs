//! View layer: reactive state, emitted actions and the element tree.
//!
//! # Data Flow
//! ```text
//! component code
//!     → builds elements / updates State
//!     → bindings emit Actions into the current RenderContext
//!     → renderer serializes actions per component id
//! ```

pub mod actions;
pub mod callbacks;
pub mod context;
pub mod elements;
pub mod id;
pub mod state;

pub use actions::{Action, UpdateOperation};
pub use callbacks::Callback;
pub use context::{ContextError, Page, RenderContext};
pub use elements::{Element, ElementBuilder, ElementError, ForEach, Item, Node};
pub use id::Id;
pub use state::{Condition, State, StateError, StateRef, When};
