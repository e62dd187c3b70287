//! Demo application served by the binary.

use serde::Deserialize;
use serde_json::json;

use trellis::http::{validation_error, RoutingError};
use trellis::routing::{ActionOutcome, Route, RouteComponent, RouteTable, RouteTableError};
use trellis::views::elements::{
    a, body, button, div, form, h1, head, html, input, li, main_, nav, p, span, title, ul,
};
use trellis::views::{Action, Callback, ForEach, Node, State};

fn layout() -> RouteComponent {
    RouteComponent::layout("demo::layout")
        .params(["children", "page"])
        .root()
        .render(|mut args| {
            let page_title = args.page()?.title.clone();
            let children = args.take_children()?;
            let page = html()
                .doctype()
                .attr("lang", "en")
                .child(head().child(title().child(page_title).build()?).build()?)
                .child(
                    body()
                        .child(
                            nav()
                                .child(a().attr("href", "/").child("Home").build()?)
                                .child(a().attr("href", "/patients").child("Patients").build()?)
                                .child(a().attr("href", "/login").child("Login").build()?)
                                .build()?,
                        )
                        .child(main_().child(children).build()?)
                        .child(
                            trellis::views::elements::script()
                                .attr("src", "/public/trellis.js")
                                .build()?,
                        )
                        .build()?,
                )
                .build()?;
            Ok(page.into())
        })
}

fn home() -> RouteComponent {
    RouteComponent::view("demo::home").render_async(|_| home_view())
}

async fn home_view() -> Result<Node, RoutingError> {
    let count = State::new("count", 0)?;
    let visible = State::new("details_visible", false)?;
    let view = div()
        .child(h1().child("Trellis demo").build()?)
        .child(
            p().child("Clicks: ")
                .child(span().class("count").build()?)
                .build()?,
        )
        .child(
            button()
                .on_click(Callback::update_state(&count, json!(1)))
                .child("Click")
                .build()?,
        )
        .child(
            button()
                .on_click(Callback::update_state(&visible, json!(true)))
                .child("Show details")
                .build()?,
        )
        .child(
            p().show_when(visible.when())
                .child("Rendered on the server, toggled on the client.")
                .build()?,
        )
        .build()?;
    Ok(view.into())
}

#[derive(Debug, Deserialize)]
struct Login {
    token: String,
}

fn login_view() -> RouteComponent {
    RouteComponent::view("demo::login").render(|_| {
        let errors = State::new("login_errors", json!(null))?;
        let view = form()
            .id("login-form")
            .errors(&errors)
            .loading_class("is-loading")
            .error_class("has-error")
            .child(input().name("token").placeholder("Access token").required(true).build()?)
            .child(button().attr("type", "submit").child("Sign in").build()?)
            .build()?;
        Ok(view.into())
    })
}

fn login_action() -> RouteComponent {
    RouteComponent::action("demo::login::action")
        .params(["body", "cookies"])
        .handle(|args| {
            let login: Login = args.body_as()?;
            if login.token.trim().is_empty() {
                return Err(validation_error(Some("A token is required")));
            }
            args.cookies()?.set("token", login.token.trim());
            Action::redirect("/patients", false)?;
            Ok(ActionOutcome::Done)
        })
}

fn patients() -> RouteComponent {
    RouteComponent::view("demo::patients").render(|_| {
        let patients = State::new(
            "patients",
            json!([{"id": 1, "name": "Ada"}, {"id": 2, "name": "Grace"}]),
        )?;
        let rows = ForEach::each(&patients, |item| {
            li().child(
                a().attr("href", format!("/patients/{}", item.field("id")))
                    .child(item.field("name"))
                    .build()?,
            )
            .build()
        })
        .bind_to("patient-list")
        .build()?;
        let view = ul().id("patient-list").child(rows).build()?;
        Ok(view.into())
    })
}

fn patient() -> RouteComponent {
    RouteComponent::view("demo::patient")
        .param("patient_id")
        .render(|args| {
            let view = p()
                .child(format!("Patient #{}", args.path("patient_id")?))
                .build()?;
            Ok(Node::from(view))
        })
}

pub fn routes() -> Result<RouteTable, RouteTableError> {
    RouteTable::builder()
        .route(Route::new("/").component(layout()).component(home()))
        .route(
            Route::new("/login")
                .component(layout())
                .component(login_view())
                .action(login_action()),
        )
        .route(
            Route::new("/patients")
                .component(layout())
                .component(patients())
                .permission("role", "admin"),
        )
        .route(
            Route::new("/patients/_patient_id_")
                .component(layout())
                .component(patient())
                .permission("role", "admin"),
        )
        .build()
}
