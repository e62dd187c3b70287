//! Inbound request view and per-request context.
//!
//! # Responsibilities
//! - Classify the request (plain browser request or framework link/partial/form)
//! - Read the previous-path navigation hint
//! - Parse query string and cookies
//! - Read and decode the body once, on first access
//!
//! # Design Decisions
//! - Only the head is parsed eagerly; the body is read when a component
//!   declares it, then cached for the rest of the request
//! - Unsupported body content types are a server/client contract error
//!   (Internal), not a BadRequest

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method};
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::http::cookies::Cookies;
use crate::http::error::RoutingError;
use crate::security::auth::Session;
use crate::views::Page;

/// Set to `1` by the client runtime on framework requests.
pub const FRAMEWORK_REQUEST_HEADER: &str = "x-trellis-request";
/// `link`, `partial` or `form`.
pub const REQUEST_TYPE_HEADER: &str = "x-trellis-request-type";
/// Path the client is navigating away from.
pub const PREVIOUS_PATH_HEADER: &str = "x-trellis-previous-path";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// How the request was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// A plain browser request.
    Plain,
    Link,
    Partial,
    Form,
}

impl RequestKind {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let is_framework = header_str(headers, FRAMEWORK_REQUEST_HEADER) == Some("1");
        if !is_framework {
            return RequestKind::Plain;
        }
        match header_str(headers, REQUEST_TYPE_HEADER) {
            Some("partial") => RequestKind::Partial,
            Some("form") => RequestKind::Form,
            _ => RequestKind::Link,
        }
    }

    pub fn is_framework(&self) -> bool {
        !matches!(self, RequestKind::Plain)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Plain => "plain",
            RequestKind::Link => "link",
            RequestKind::Partial => "partial",
            RequestKind::Form => "form",
        }
    }
}

/// Decoded query string. Repeated keys keep every value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query(Map<String, Value>);

impl Query {
    pub fn parse(raw: &str) -> Self {
        Self(parse_urlencoded(raw.as_bytes()))
    }

    /// First value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self.0.get(name)? {
            Value::String(value) => Some(value.as_str()),
            Value::Array(values) => values.first().and_then(Value::as_str),
            _ => None,
        }
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        match self.0.get(name) {
            Some(Value::String(value)) => vec![value.as_str()],
            Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// `application/x-www-form-urlencoded` decoding. A key seen once maps to a
/// string, a repeated key to an array of strings.
pub fn parse_urlencoded(bytes: &[u8]) -> Map<String, Value> {
    let mut result = Map::new();
    for (key, value) in url::form_urlencoded::parse(bytes) {
        let value = Value::String(value.into_owned());
        match result.get_mut(&*key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                result.insert(key.into_owned(), value);
            }
        }
    }
    result
}

/// Everything about a request except its body.
#[derive(Debug, Clone)]
pub struct RequestHead {
    method: Method,
    path: String,
    headers: HeaderMap,
    query: Query,
    cookies: Cookies,
    kind: RequestKind,
    previous_path: Option<String>,
    request_id: String,
}

impl RequestHead {
    pub fn from_parts(parts: &Parts) -> Self {
        let headers = parts.headers.clone();
        let kind = RequestKind::from_headers(&headers);
        let previous_path = header_str(&headers, PREVIOUS_PATH_HEADER)
            .map(str::trim)
            .filter(|path| path.starts_with('/'))
            .map(str::to_string);
        let request_id = header_str(&headers, REQUEST_ID_HEADER)
            .unwrap_or("unknown")
            .to_string();

        Self {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            query: Query::parse(parts.uri.query().unwrap_or("")),
            cookies: Cookies::from_headers(&headers),
            headers,
            kind,
            previous_path,
            request_id,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        header_str(&self.headers, name)
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn cookies(&self) -> &Cookies {
        &self.cookies
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn is_framework(&self) -> bool {
        self.kind.is_framework()
    }

    /// The navigation hint. Only framework requests carry one.
    pub fn previous_path(&self) -> Option<&str> {
        if self.is_framework() {
            self.previous_path.as_deref()
        } else {
            None
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// POST, PUT, PATCH and DELETE run the route's action.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self.method,
            Method::POST | Method::PUT | Method::PATCH | Method::DELETE
        )
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Per-request state shared by the guard and the renderer.
pub struct RequestContext {
    head: RequestHead,
    page: Page,
    session: Option<Session>,
    // Body is not Sync; the lock keeps the context shareable across awaits.
    unread: Mutex<Option<Body>>,
    decoded: Option<Value>,
    body_limit: usize,
}

impl RequestContext {
    pub fn new(head: RequestHead, body: Body, title: &str, body_limit: usize) -> Self {
        let page = Page::new(head.path(), title);
        Self {
            head,
            page,
            session: None,
            unread: Mutex::new(Some(body)),
            decoded: None,
            body_limit,
        }
    }

    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub(crate) fn set_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Decoded body. Read on first call, cached afterwards.
    pub async fn body(&mut self) -> Result<Value, RoutingError> {
        if let Some(value) = &self.decoded {
            return Ok(value.clone());
        }
        let body = self.unread.lock().take().ok_or_else(|| {
            RoutingError::bad_request().with_message("Request body is unavailable")
        })?;

        let content_type = self.head.header(CONTENT_TYPE.as_str()).unwrap_or("").to_string();
        let decoder = if content_type.starts_with("application/json") {
            Decoder::Json
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            Decoder::Form
        } else {
            tracing::error!(
                request_id = %self.head.request_id(),
                content_type = %content_type,
                "Unsupported request body content type"
            );
            return Err(RoutingError::internal(format!(
                "Unsupported content type: {}",
                content_type
            )));
        };

        let bytes = axum::body::to_bytes(body, self.body_limit)
            .await
            .map_err(|err| {
                tracing::warn!(request_id = %self.head.request_id(), error = %err, "Failed to read request body");
                RoutingError::bad_request().with_message("Request body could not be read")
            })?;

        let value = match decoder {
            Decoder::Json => serde_json::from_slice(&bytes).map_err(|_| {
                RoutingError::bad_request().with_message("Invalid JSON body received")
            })?,
            Decoder::Form => Value::Object(parse_urlencoded(&bytes)),
        };
        self.decoded = Some(value.clone());
        Ok(value)
    }
}

enum Decoder {
    Json,
    Form,
}
