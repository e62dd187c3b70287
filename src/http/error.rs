//! Routing error taxonomy.
//!
//! # Responsibilities
//! - Carry status, message, field details and pre-collected actions
//! - Convert library errors raised inside components into `Internal`
//!
//! # Design Decisions
//! - One struct with an `ErrorKind` instead of one type per status, so
//!   component code returns a single error type and uses `?` freely
//! - Errors are caught exactly once, in the route handler

use serde::Serialize;
use thiserror::Error;

use axum::http::StatusCode;

use crate::config::{ConfigError, ValidationError};
use crate::render::ActionsMap;
use crate::routing::RouteTableError;
use crate::views::{ContextError, ElementError, StateError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    Internal,
}

impl ErrorKind {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::MethodNotAllowed => "Method Not Allowed",
            ErrorKind::Internal => "Internal Server Error",
        }
    }
}

/// Per-field validation detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub message: String,
    pub path: Option<String>,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

/// A request-level failure, answered with its status code.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RoutingError {
    kind: ErrorKind,
    message: String,
    errors: Vec<FieldError>,
    actions: Option<ActionsMap>,
}

impl RoutingError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.default_message().to_string(),
            errors: Vec::new(),
            actions: None,
        }
    }

    pub fn bad_request() -> Self {
        Self::new(ErrorKind::BadRequest)
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorKind::Unauthorized)
    }

    pub fn forbidden() -> Self {
        Self::new(ErrorKind::Forbidden)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(ErrorKind::MethodNotAllowed)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal).with_message(message)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_field_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = errors;
        self
    }

    /// Attach actions collected before the failure.
    pub fn with_actions(mut self, actions: ActionsMap) -> Self {
        self.actions = Some(actions);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn actions(&self) -> Option<&ActionsMap> {
        self.actions.as_ref()
    }
}

/// A `BadRequest` with an optional message.
pub fn validation_error(message: Option<&str>) -> RoutingError {
    let error = RoutingError::bad_request();
    match message {
        Some(message) => error.with_message(message),
        None => error,
    }
}

pub fn unauthorized_error(message: Option<&str>) -> RoutingError {
    let error = RoutingError::unauthorized();
    match message {
        Some(message) => error.with_message(message),
        None => error,
    }
}

pub fn not_found(message: Option<&str>) -> RoutingError {
    let error = RoutingError::not_found();
    match message {
        Some(message) => error.with_message(message),
        None => error,
    }
}

macro_rules! internal_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for RoutingError {
                fn from(err: $source) -> Self {
                    RoutingError::internal(err.to_string())
                }
            }
        )*
    };
}

internal_from!(
    ContextError,
    StateError,
    ElementError,
    RouteTableError,
    ConfigError,
    ValidationError,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_messages_and_status() {
        let cases = [
            (RoutingError::bad_request(), 400, "Bad Request"),
            (RoutingError::unauthorized(), 401, "Unauthorized"),
            (RoutingError::forbidden(), 403, "Forbidden"),
            (RoutingError::not_found(), 404, "Not Found"),
            (RoutingError::method_not_allowed(), 405, "Method Not Allowed"),
            (RoutingError::internal("Internal Server Error"), 500, "Internal Server Error"),
        ];
        for (err, status, message) in cases {
            assert_eq!(err.status().as_u16(), status);
            assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn test_helpers() {
        let err = validation_error(Some("email is taken"))
            .with_field_errors(vec![FieldError::new("email", "taken")]);
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.message(), "email is taken");
        assert_eq!(err.field_errors()[0].path.as_deref(), Some("email"));

        assert_eq!(unauthorized_error(None).message(), "Unauthorized");
        assert_eq!(not_found(Some("no patient")).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_library_errors_become_internal() {
        let err: RoutingError = ContextError::NoActiveContext.into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.message(), "no active render context");
    }
}
