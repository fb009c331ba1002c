use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use compadmin_types::MethodFailure;
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::component::{Component, Property};
use crate::config::AdminConfig;
use crate::demo::Greeter;
use crate::registry::Registry;
use crate::server::Server;

#[derive(Default)]
struct Probe {
    calls: Mutex<Vec<String>>,
}

impl Probe {
    fn record(&self, call: String) -> Result<(), MethodFailure> {
        self.calls.lock()?.push(call);
        Ok(())
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Component for Probe {
    fn name(&self) -> &str {
        "Probe"
    }

    fn properties(&self) -> Vec<Property> {
        vec![Property::new("calls", self.calls().len())]
    }
}

fn probe_registry() -> Registry<Probe> {
    let mut reg = Registry::new();
    reg.register1("setName", |p: &Probe, name: String| p.record(format!("setName({})", name)));
    reg.register2("add", |p: &Probe, a: i32, b: i64| p.record(format!("add({})", i64::from(a) + b)));
    reg.register0("fail", |_: &Probe| Err::<(), _>(MethodFailure::new("refused")));
    reg.register0("boom", |_: &Probe| -> Result<(), MethodFailure> { panic!("probe exploded") });
    reg
}

fn admin_config() -> AdminConfig {
    AdminConfig {
        mount_path: "/admin/".into(),
        ..AdminConfig::default()
    }
}

fn probe_app() -> (Router, Arc<Probe>) {
    let probe = Arc::new(Probe::default());
    let server = Server::new(probe.clone(), probe_registry(), &admin_config());
    (server.router(), probe)
}

async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: Router, uri: &str, form: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_owned()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn body_text(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(resp: &Response) -> &str {
    resp.headers()[header::LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn default_view() {
    let (app, _) = probe_app();
    let resp = get(app, "/admin/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::PRAGMA], "no-cache");
    assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-cache");
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");
    let body = body_text(resp).await;
    assert!(body.contains("Probe administration"));
    assert!(body.contains("setName"));
}

#[tokio::test]
async fn trailing_separator_redirect_keeps_query() {
    let (app, probe) = probe_app();
    let resp = get(app.clone(), "/admin?invokeMethod=setName&methodSig=4&fieldValue=Alice").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        location(&resp),
        "/admin/?invokeMethod=setName&methodSig=4&fieldValue=Alice"
    );
    // nothing runs until the redirected request arrives
    assert!(probe.calls().is_empty());

    let resp = get(app, "/admin").await;
    assert_eq!(location(&resp), "/admin/");
}

#[tokio::test]
async fn invoke_redirects_to_current_path() {
    let (app, probe) = probe_app();
    let resp = get(app, "/admin/?invokeMethod=setName&methodSig=4&fieldValue=Alice").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/admin/");
    assert_eq!(probe.calls(), vec!["setName(Alice)"]);
}

#[tokio::test]
async fn invoke_by_form_post() {
    let (app, probe) = probe_app();
    let resp = post_form(
        app,
        "/admin/",
        "invokeMethod=add&methodSig=0%3B3&fieldValue=2%3B40",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(probe.calls(), vec!["add(42)"]);
}

#[tokio::test]
async fn bad_type_code_renders_error() {
    let (app, probe) = probe_app();
    let resp = get(app, "/admin/?invokeMethod=setName&methodSig=99&fieldValue=Alice").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Invoked method: setName"));
    assert!(body.contains("99"));
    assert!(body.contains("class=\"error\""));
    assert!(probe.calls().is_empty());
}

#[tokio::test]
async fn unknown_method_renders_error() {
    let (app, _) = probe_app();
    let resp = get(app, "/admin/?invokeMethod=noSuchThing").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("no method noSuchThing()"));
    assert!(body.contains("method resolution"));
}

#[tokio::test]
async fn count_and_type_mismatches_render_errors() {
    let (app, probe) = probe_app();
    let body = body_text(get(app.clone(), "/admin/?invokeMethod=add&methodSig=0;3&fieldValue=1").await).await;
    assert!(body.contains("wrong number of arguments"));

    let body = body_text(get(app, "/admin/?invokeMethod=add&methodSig=0;3&fieldValue=one;2").await).await;
    assert!(body.contains("is not a valid i32"));
    assert!(probe.calls().is_empty());
}

#[tokio::test]
async fn handler_failures_and_panics_render_errors() {
    let (app, _) = probe_app();
    let resp = get(app.clone(), "/admin/?invokeMethod=fail").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("refused"));

    let resp = get(app, "/admin/?invokeMethod=boom").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("probe exploded"));
}

#[tokio::test]
async fn cancel_wins_over_invoke() {
    let (app, probe) = probe_app();
    let resp = post_form(
        app,
        "/admin/",
        "invokeMethod=setName&methodSig=4&fieldValue=Bob&cancelMethodInvocation=Cancel",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Probe administration"));
    assert!(probe.calls().is_empty());
}

#[tokio::test]
async fn confirm_then_reload() {
    let (app, probe) = probe_app();
    let resp = get(app.clone(), "/admin/?shouldInvokeMethod=setName").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Invoke setName on Probe?"));
    assert!(probe.calls().is_empty());

    let resp = get(app, "/admin/?reloadComponent=true").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/admin/");
}

#[tokio::test]
async fn property_view() {
    let (app, _) = probe_app();
    let body = body_text(get(app.clone(), "/admin/?propertyName=calls").await).await;
    assert!(body.contains("<pre>0</pre>"));
    let body = body_text(get(app, "/admin/?propertyName=colour").await).await;
    assert!(body.contains("Probe has no property named colour"));
}

#[tokio::test]
async fn outside_mount_is_not_found() {
    let (app, _) = probe_app();
    let resp = get(app, "/elsewhere/").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn greeter_end_to_end() {
    let greeter = Arc::new(Greeter::default());
    let server = Server::new(greeter.clone(), Greeter::registry(), &AdminConfig::default());
    let app = server.router();

    let resp = get(app.clone(), "/?invokeMethod=setName&methodSig=4&fieldValue=Alice").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let resp = get(app.clone(), "/?invokeMethod=greet&methodSig=0&fieldValue=2").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(greeter.greeted(), 2);

    let body = body_text(get(app.clone(), "/?propertyName=name").await).await;
    assert!(body.contains("<pre>Alice</pre>"));

    let body = body_text(get(app, "/?eventSetName=greeting").await).await;
    assert!(body.contains("no listeners"));
}
