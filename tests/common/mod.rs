//! Shared fixture application for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tower::ServiceExt;

use trellis::config::AppConfig;
use trellis::http::request::{FRAMEWORK_REQUEST_HEADER, PREVIOUS_PATH_HEADER, REQUEST_TYPE_HEADER};
use trellis::http::{validation_error, FieldError, RequestHead, RoutingError};
use trellis::routing::{ActionOutcome, Route, RouteComponent, RouteTable};
use trellis::security::{SessionData, SessionGuard};
use trellis::views::elements::{body, button, div, h1, html, li, p, ul};
use trellis::views::{Action, Callback, ForEach, Node, State};
use trellis::HttpServer;

/// Header the test guard turns into a `role` claim.
pub const ROLE_HEADER: &str = "x-test-role";

/// Grants `{"role": <header value>}` when the test header is present.
#[derive(Debug)]
pub struct HeaderGuard;

impl SessionGuard for HeaderGuard {
    fn verify(&self, request: &RequestHead) -> Option<SessionData> {
        let role = request.header(ROLE_HEADER)?;
        let mut data = Map::new();
        data.insert("role".into(), Value::String(role.to_string()));
        Some(data)
    }
}

pub fn layout() -> RouteComponent {
    RouteComponent::layout("fixture::layout")
        .param("children")
        .root()
        .render(|mut args| {
            let children = args.take_children()?;
            let page = html()
                .child(
                    body()
                        .child(p().child("Fixture layout").build()?)
                        .child(children)
                        .build()?,
                )
                .build()?;
            Ok(page.into())
        })
}

pub fn home() -> RouteComponent {
    RouteComponent::view("fixture::home").render_async(|_| home_view())
}

async fn home_view() -> Result<Node, RoutingError> {
    tokio::task::yield_now().await;
    Ok(div().child("Home").build()?.into())
}

pub fn counter() -> RouteComponent {
    RouteComponent::view("fixture::counter").render(|_| {
        let count = State::new("count", 0)?;
        let view = div()
            .child(
                button()
                    .id("inc")
                    .on_click(Callback::update_state(&count, json!(1)))
                    .child("+")
                    .build()?,
            )
            .child(p().show_when(count.when()).child("clicked").build()?)
            .build()?;
        Ok(view.into())
    })
}

pub fn patients() -> RouteComponent {
    RouteComponent::view("fixture::patients").render(|_| Ok(h1().child("Patients").build()?.into()))
}

pub fn admin_layout() -> RouteComponent {
    RouteComponent::layout("fixture::admin_layout")
        .param("children")
        .render(|mut args| {
            let children = args.take_children()?;
            Ok(div().class("admin").child(children).build()?.into())
        })
}

pub fn list() -> RouteComponent {
    RouteComponent::view("fixture::list")
        .param("children")
        .render(|mut args| {
            let rows = args.take_children()?;
            Ok(div().class("list").child(rows).build()?.into())
        })
}

pub fn rows() -> RouteComponent {
    RouteComponent::partial("fixture::rows")
        .param("query")
        .render(|args| {
            let filter = args.query()?.get("q").unwrap_or("").to_string();
            let items = State::new("rows", json!([{"name": "alpha"}, {"name": "beta"}]))?;
            let rows = ForEach::each(&items, |item| li().child(item.field("name")).build())
                .bind_to("rows")
                .build()?;
            Ok(ul()
                .id("rows")
                .attr("data-filter", filter)
                .child(rows)
                .build()?
                .into())
        })
}

pub fn doctor() -> RouteComponent {
    RouteComponent::view("fixture::doctor")
        .params(["doctor_id", "page"])
        .render(|args| {
            let text = format!("Doctor {} on {}", args.path("doctor_id")?, args.page()?.path);
            Ok(p().child(text).build()?.into())
        })
}

pub fn doctor_new() -> RouteComponent {
    RouteComponent::view("fixture::doctor_new").render(|_| Ok(p().child("New doctor").build()?.into()))
}

#[derive(Debug, Deserialize)]
struct Login {
    email: String,
}

pub fn login_view() -> RouteComponent {
    RouteComponent::view("fixture::login").render(|_| Ok(p().child("Login").build()?.into()))
}

pub fn login_action() -> RouteComponent {
    RouteComponent::action("fixture::login::action")
        .params(["body", "cookies"])
        .handle(|args| {
            let login: Login = args.body_as()?;
            if !login.email.contains('@') {
                return Err(validation_error(Some("Invalid email"))
                    .with_field_errors(vec![FieldError::new("email", "must contain @")]));
            }
            args.cookies()?.set("session", "s3cret");
            Action::redirect("/", false)?;
            Ok(ActionOutcome::Done)
        })
}

pub fn redirect_then_fail() -> RouteComponent {
    RouteComponent::action("fixture::redirect_then_fail").handle_async(|_| redirect_then_fail_action())
}

async fn redirect_then_fail_action() -> Result<ActionOutcome, RoutingError> {
    Action::redirect("/next", true)?;
    Err(validation_error(Some("Nope")))
}

pub fn explicit_response() -> RouteComponent {
    RouteComponent::action("fixture::explicit").handle(|_| {
        Action::refresh_view(false)?;
        let response = (StatusCode::CREATED, "created").into_response();
        Ok(ActionOutcome::Respond(response))
    })
}

pub fn slow() -> RouteComponent {
    RouteComponent::view("fixture::slow").render(|_| {
        std::thread::sleep(Duration::from_millis(200));
        Ok(p().child("slow").build()?.into())
    })
}

pub fn routes() -> RouteTable {
    RouteTable::builder()
        .route(Route::new("/").component(layout()).component(home()))
        .route(Route::new("/counter").component(layout()).component(counter()))
        .route(
            Route::new("/patients")
                .component(layout())
                .component(admin_layout())
                .component(patients())
                .permission("role", "admin"),
        )
        .route(
            Route::new("/list")
                .component(layout())
                .component(list())
                .component(rows()),
        )
        .route(Route::new("/doctors/new").component(layout()).component(doctor_new()))
        .route(Route::new("/doctors/_doctor_id_").component(layout()).component(doctor()))
        .route(
            Route::new("/login")
                .component(layout())
                .component(login_view())
                .action(login_action()),
        )
        .route(Route::new("/fail").action(redirect_then_fail()))
        .route(Route::new("/explicit").action(explicit_response()))
        .route(Route::new("/slow").component(slow()))
        .build()
        .expect("fixture routes are valid")
}

pub fn app_with_config(config: AppConfig) -> axum::Router {
    HttpServer::with_guards(config, routes(), vec![Arc::new(HeaderGuard) as Arc<dyn SessionGuard>])
        .router()
}

pub fn app() -> axum::Router {
    app_with_config(AppConfig::default())
}

/// Response parts with the body as text.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("response body is JSON")
    }
}

pub async fn send(app: axum::Router, request: Request<Body>) -> TestResponse {
    let response: Response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body is readable");
    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).expect("body is UTF-8"),
    }
}

pub fn get(path: &str) -> Request<Body> {
    Request::get(path).body(Body::empty()).unwrap()
}

/// A framework request of `kind` (`link`, `partial` or `form`).
pub fn framework(method: &str, path: &str, kind: &str, previous: Option<&str>) -> axum::http::request::Builder {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(FRAMEWORK_REQUEST_HEADER, "1")
        .header(REQUEST_TYPE_HEADER, kind);
    if let Some(previous) = previous {
        builder = builder.header(PREVIOUS_PATH_HEADER, previous);
    }
    builder
}

/// Offset of `"id":` in raw JSON. Parsed objects sort their keys, so the
/// leaf-first order of the actions map is only visible in the raw text.
pub fn key_position(raw: &str, id: &str) -> usize {
    raw.find(&format!("\"{}\":", id))
        .unwrap_or_else(|| panic!("{} is not a key in {}", id, raw))
}

/// Component id as the renderer addresses it.
pub fn id_of(component: &RouteComponent) -> String {
    component.id().to_string()
}
