//! Request cookies and queued `Set-Cookie` values.
//!
//! # Design Decisions
//! - Clones share the queue, so a component can set cookies through its
//!   own `Cookies` handle and the response still sees them
//! - Queued cookies are attached to successful responses only

use std::sync::Arc;

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use indexmap::IndexMap;
use parking_lot::Mutex;

#[derive(Debug, Clone, Default)]
pub struct Cookies {
    values: IndexMap<String, String>,
    pending: Arc<Mutex<Vec<String>>>,
}

impl Cookies {
    /// Parse every `Cookie` header of a request.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut values = IndexMap::new();
        for header in headers.get_all(COOKIE) {
            if let Ok(raw) = header.to_str() {
                values.extend(parse_cookie_header(raw));
            }
        }
        Self {
            values,
            pending: Arc::default(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Queue `name=value; Path=/`.
    pub fn set(&self, name: &str, value: &str) {
        self.set_raw(format!("{}={}; Path=/", name, value));
    }

    /// Queue a full `Set-Cookie` value.
    pub fn set_raw(&self, cookie: impl Into<String>) {
        self.pending.lock().push(cookie.into());
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.lock().is_empty()
    }

    /// Append queued cookies as `Set-Cookie` headers. Invalid values are skipped.
    pub fn write_to(&self, headers: &mut HeaderMap) {
        for cookie in self.pending.lock().iter() {
            match HeaderValue::from_str(cookie) {
                Ok(value) => {
                    headers.append(SET_COOKIE, value);
                }
                Err(_) => tracing::warn!(cookie = %cookie, "Skipping invalid Set-Cookie value"),
            }
        }
    }
}

/// Split a `Cookie` header into pairs. Chunks without `=` are kept under an
/// empty name; surrounding double quotes are removed.
pub fn parse_cookie_header(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter_map(|chunk| {
            let (key, value) = chunk.split_once('=').unwrap_or(("", chunk));
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() && value.is_empty() {
                return None;
            }
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}
