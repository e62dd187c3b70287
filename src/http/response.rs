//! Response assembly.
//!
//! # Responsibilities
//! - Build HTML and JSON responses
//! - Attach queued cookies to successful responses
//! - Turn a `RoutingError` into the page or envelope the client expects
//!
//! # Design Decisions
//! - Error responses never set cookies
//! - Framework clients get JSON errors; browsers get a minimal HTML page
//! - Internal error detail stays in the logs; the page shows the generic text

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::Map;

use crate::http::cookies::Cookies;
use crate::http::error::{ErrorKind, RoutingError};
use crate::render::ActionEnvelope;
use crate::views::elements::escape_text;

pub fn html(status: StatusCode, body: String, cookies: Option<&Cookies>) -> Response {
    let mut response = (status, Html(body)).into_response();
    if let Some(cookies) = cookies {
        cookies.write_to(response.headers_mut());
    }
    response
}

/// Serialized straight from `body`, so map order is kept.
pub fn json<T: Serialize>(status: StatusCode, body: &T, cookies: Option<&Cookies>) -> Response {
    let mut response = (status, Json(body)).into_response();
    if let Some(cookies) = cookies {
        cookies.write_to(response.headers_mut());
    }
    response
}

/// `<html lang="en"><body><h1>{message}</h1></body></html>`
pub fn error_page(message: &str) -> String {
    format!(
        "<html lang=\"en\"><body><h1>{}</h1></body></html>",
        escape_text(message)
    )
}

pub fn error_response(err: &RoutingError, framework: bool) -> Response {
    let status = err.status();
    if !framework {
        let message = match err.kind() {
            ErrorKind::Internal => ErrorKind::Internal.default_message(),
            _ => err.message(),
        };
        return html(status, error_page(message), None);
    }

    match err.actions() {
        Some(actions) if !actions.is_empty() => json(status, &ActionEnvelope { actions }, None),
        _ => json(status, &Map::new(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ActionsMap;
    use axum::http::header::{CONTENT_TYPE, SET_COOKIE};
    use axum::http::HeaderMap;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_internal_detail_is_not_shown() {
        let err = RoutingError::internal("Unsupported content type: text/plain");
        let response = error_response(&err, false);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_text(response).await,
            r#"<html lang="en"><body><h1>Internal Server Error</h1></body></html>"#
        );

        let err = RoutingError::bad_request().with_message("Invalid JSON body received");
        assert_eq!(
            body_text(error_response(&err, false)).await,
            r#"<html lang="en"><body><h1>Invalid JSON body received</h1></body></html>"#
        );
    }

    #[tokio::test]
    async fn test_plain_error_page() {
        let response = error_response(&RoutingError::unauthorized(), false);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert_eq!(
            body_text(response).await,
            r#"<html lang="en"><body><h1>Unauthorized</h1></body></html>"#
        );
    }

    #[tokio::test]
    async fn test_framework_error_envelope() {
        let response = error_response(&RoutingError::forbidden(), true);
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "{}");

        let mut actions = ActionsMap::new();
        actions.insert("v_x".into(), Some(vec![serde_json::json!(["redirect", ["/next", false]])]));
        let err = RoutingError::bad_request().with_actions(actions);
        let response = error_response(&err, true);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_text(response).await,
            r#"{"actions":{"v_x":[["redirect",["/next",false]]]}}"#
        );
    }

    #[test]
    fn test_cookies_attached_to_success_only() {
        let cookies = Cookies::from_headers(&HeaderMap::new());
        cookies.set("session", "abc");

        let response = html(StatusCode::OK, "<p>ok</p>".into(), Some(&cookies));
        assert_eq!(response.headers()[SET_COOKIE], "session=abc; Path=/");

        let response = error_response(&RoutingError::bad_request(), false);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }
}
