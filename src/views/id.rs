//! Opaque identifiers for DOM nodes and state slots.
//!
//! # Design Decisions
//! - Random ids combine a process-wide counter with a short random suffix,
//!   so two ids handed out by the same process never collide
//! - Deterministic ids are a pure function of `(base, prefix)`: SHA-256,
//!   URL-safe base64, truncated. The client can address the same element
//!   across independent requests without server-side session state

use std::sync::atomic::{AtomicU64, Ordering};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of the hashed part of a deterministic id.
const HASH_PART_LEN: usize = 8;

/// Length of the random suffix of a random id.
const RANDOM_PART_LEN: usize = 4;

/// Relaxed ordering is enough, only uniqueness matters.
static ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque string token addressing a DOM node or a state slot on the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Wrap an existing token.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a fresh id, distinct from every other id produced by this process.
    pub fn random(prefix: Option<&str>) -> Self {
        let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let random = uuid::Uuid::new_v4().simple().to_string();
        let token = format!("{:x}{}", counter, &random[..RANDOM_PART_LEN]);
        Self(with_prefix(token, prefix))
    }

    /// Derive an id from `base`. Same `base` and `prefix` always give the same id.
    pub fn deterministic(base: &str, prefix: Option<&str>) -> Self {
        let digest = Sha256::digest(base.as_bytes());
        let mut token = URL_SAFE_NO_PAD.encode(digest);
        token.truncate(HASH_PART_LEN);
        Self(with_prefix(token, prefix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn with_prefix(token: String, prefix: Option<&str>) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{}_{}", p, token),
        _ => token,
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&Id> for Id {
    fn from(value: &Id) -> Self {
        value.clone()
    }
}

impl From<Id> for serde_json::Value {
    fn from(id: Id) -> Self {
        serde_json::Value::String(id.0)
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
