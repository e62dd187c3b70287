//! Reactive state snapshots and conditions over them.
//!
//! A [`State`] is immutable. "Mutating" it produces a new snapshot with the
//! same key and emits an `updateState` action into the active render context.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::views::actions::{Action, UpdateOperation};
use crate::views::context::{ContextError, RenderContext};
use crate::views::id::Id;

/// Errors raised by state operations.
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("state '{0}' does not hold a sequence")]
    NotASequence(String),

    #[error("state '{0}' does not hold an object")]
    NotAnObject(String),

    #[error("state value cannot be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Type-erased snapshot of a state, as referenced by actions and conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct StateRef {
    name: String,
    key: String,
    value: Value,
    parent: Option<Arc<StateRef>>,
}

impl StateRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn parent(&self) -> Option<&StateRef> {
        self.parent.as_deref()
    }

    /// The state the client registers: the parent for projections, itself otherwise.
    pub fn root(&self) -> &StateRef {
        match &self.parent {
            Some(parent) => parent,
            None => self,
        }
    }

    /// Wire address: `(root key, None)` for roots, `(parent key, Some(field))` for projections.
    pub fn address(&self) -> (&str, Option<&str>) {
        match &self.parent {
            Some(parent) => (parent.key(), Some(self.name.as_str())),
            None => (self.key.as_str(), None),
        }
    }

    pub(crate) fn address_values(&self) -> [Value; 2] {
        let (key, field) = self.address();
        [
            Value::from(key),
            field.map(Value::from).unwrap_or(Value::Null),
        ]
    }

    pub fn is_truthy(&self) -> bool {
        is_truthy(&self.value)
    }
}

/// Immutable snapshot of a named, keyed value destined for client-side reactivity.
#[derive(Debug, Clone)]
pub struct State<T> {
    value: T,
    snapshot: StateRef,
}

impl<T: Serialize + Clone> State<T> {
    /// Create a root state. The key is derived from the lowercased name.
    pub fn new(name: impl Into<String>, value: T) -> Result<Self, StateError> {
        let name = name.into();
        let key = make_key(&name);
        Self::with_key(name, key, value)
    }

    /// Create a root state with an explicit key.
    pub fn with_key(
        name: impl Into<String>,
        key: impl Into<String>,
        value: T,
    ) -> Result<Self, StateError> {
        Self::build(name.into(), key.into(), value, None)
    }

    fn build(
        name: String,
        key: String,
        value: T,
        parent: Option<Arc<StateRef>>,
    ) -> Result<Self, StateError> {
        let json = serde_json::to_value(&value)?;
        Ok(Self {
            value,
            snapshot: StateRef {
                name,
                key,
                value: json,
                parent,
            },
        })
    }

    /// Replace the value. Returns a new state and emits `updateState`.
    pub fn update(&self, value: T) -> Result<Self, StateError> {
        let next = self.replaced(value)?;
        let wire_value = next.snapshot.value.clone();
        RenderContext::emit(Action::UpdateState {
            state: next.snapshot.clone(),
            value: wire_value,
            operation: None,
        })?;
        Ok(next)
    }

    /// Project a field of an object-valued state.
    pub fn field(&self, name: &str) -> Result<State<Value>, StateError> {
        let object = self
            .snapshot
            .value
            .as_object()
            .ok_or_else(|| StateError::NotAnObject(self.snapshot.key.clone()))?;
        let value = object.get(name).cloned().unwrap_or(Value::Null);
        State::build(
            name.to_string(),
            format!("{}.{}", self.snapshot.key, name),
            value,
            Some(Arc::new(self.snapshot.clone())),
        )
    }

    pub fn when(&self) -> When {
        When::truthy(self)
    }

    pub fn when_eq(&self, value: impl Into<Value>) -> When {
        When::equal_to(self, value)
    }

    pub fn when_ne(&self, value: impl Into<Value>) -> When {
        When::not_equal_to(self, value)
    }

    fn replaced(&self, value: T) -> Result<Self, StateError> {
        Self::build(
            self.snapshot.name.clone(),
            self.snapshot.key.clone(),
            value,
            self.snapshot.parent.clone(),
        )
    }
}

impl<T> State<T> {
    pub fn name(&self) -> &str {
        &self.snapshot.name
    }

    pub fn key(&self) -> &str {
        &self.snapshot.key
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn parent(&self) -> Option<&StateRef> {
        self.snapshot.parent()
    }

    pub fn snapshot(&self) -> &StateRef {
        &self.snapshot
    }

    pub fn is_truthy(&self) -> bool {
        self.snapshot.is_truthy()
    }
}

impl<U: Serialize + Clone> State<Vec<U>> {
    /// Append an item. The emitted action carries only the appended item.
    pub fn append(&self, item: U) -> Result<Self, StateError> {
        let wire_item = serde_json::to_value(&item)?;
        let mut items = self.value.clone();
        items.push(item);
        let next = self.replaced(items)?;
        RenderContext::emit(Action::UpdateState {
            state: next.snapshot.clone(),
            value: wire_item,
            operation: Some(UpdateOperation::Append),
        })?;
        Ok(next)
    }
}

impl State<Value> {
    /// Append to a dynamically typed state. Fails unless it holds an array.
    pub fn append(&self, item: Value) -> Result<Self, StateError> {
        let mut items = match &self.value {
            Value::Array(items) => items.clone(),
            _ => return Err(StateError::NotASequence(self.snapshot.key.clone())),
        };
        items.push(item.clone());
        let next = self.replaced(Value::Array(items))?;
        RenderContext::emit(Action::UpdateState {
            state: next.snapshot.clone(),
            value: item,
            operation: Some(UpdateOperation::Append),
        })?;
        Ok(next)
    }

    /// Set one field of an object-valued state. Returns the new parent state
    /// and emits an update addressed to the field.
    pub fn set_field(&self, name: &str, value: Value) -> Result<Self, StateError> {
        let mut object = match &self.value {
            Value::Object(object) => object.clone(),
            _ => return Err(StateError::NotAnObject(self.snapshot.key.clone())),
        };
        object.insert(name.to_string(), value.clone());
        let next = self.replaced(Value::Object(object))?;
        let field = State::build(
            name.to_string(),
            format!("{}.{}", self.snapshot.key, name),
            value.clone(),
            Some(Arc::new(next.snapshot.clone())),
        )?;
        RenderContext::emit(Action::UpdateState {
            state: field.snapshot,
            value,
            operation: None,
        })?;
        Ok(next)
    }
}

impl State<bool> {
    /// Same key, opposite value. Emits nothing.
    pub fn negate(&self) -> Self {
        let mut snapshot = self.snapshot.clone();
        snapshot.value = Value::Bool(!self.value);
        Self {
            value: !self.value,
            snapshot,
        }
    }
}

impl<T> PartialEq for State<T> {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot.key == other.snapshot.key
    }
}

impl<T> Eq for State<T> {}

impl<T> Hash for State<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.snapshot.key.hash(state);
    }
}

impl<T> std::fmt::Display for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&value_to_text(&self.snapshot.value))
    }
}

fn make_key(name: &str) -> String {
    let base = name.to_lowercase();
    Id::deterministic(&base, Some(&format!("sv_{}", base))).to_string()
}

/// Comparison a [`When`] performs against its state.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    EqualTo(Value),
    NotEqualTo(Value),
    Truthy,
}

/// Declarative condition over a state, evaluated once at render time and
/// shipped to the client for re-evaluation on later state changes.
#[derive(Debug, Clone, PartialEq)]
pub struct When {
    state: StateRef,
    condition: Condition,
    result: Option<String>,
    negated: bool,
}

impl When {
    pub fn truthy<T>(state: &State<T>) -> Self {
        Self::from_ref(state.snapshot().clone(), Condition::Truthy)
    }

    pub fn equal_to<T>(state: &State<T>, value: impl Into<Value>) -> Self {
        Self::from_ref(state.snapshot().clone(), Condition::EqualTo(value.into()))
    }

    pub fn not_equal_to<T>(state: &State<T>, value: impl Into<Value>) -> Self {
        Self::from_ref(state.snapshot().clone(), Condition::NotEqualTo(value.into()))
    }

    pub fn from_ref(state: StateRef, condition: Condition) -> Self {
        Self {
            state,
            condition,
            result: None,
            negated: false,
        }
    }

    /// Payload used when the client evaluates the condition, e.g. the class to toggle.
    pub fn then(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    /// Invert the outcome (a `WhenNot` on the wire).
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    pub fn state(&self) -> &StateRef {
        &self.state
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn evaluate(&self) -> bool {
        let current = self.state.value();
        let outcome = match &self.condition {
            Condition::EqualTo(expected) => current == expected,
            Condition::NotEqualTo(expected) => current != expected,
            Condition::Truthy => is_truthy(current),
        };
        outcome != self.negated
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        if self.negated {
            "WhenNot"
        } else {
            "When"
        }
    }

    pub(crate) fn op_values(&self) -> [Value; 2] {
        match &self.condition {
            Condition::EqualTo(v) => [Value::from("equal_to"), v.clone()],
            Condition::NotEqualTo(v) => [Value::from("not_equal_to"), v.clone()],
            Condition::Truthy => [Value::Null, Value::Null],
        }
    }
}

/// Truthiness as the client runtime understands it.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
