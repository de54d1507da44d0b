//! End-to-end HTTP tests over a real socket.

use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::StatusCode;
use serde_json::{json, Value};
use unified_gateway::assets::{DirectorySource, FnSource};
use unified_gateway::{Gateway, GatewayConfig, JsonObject, RequestQuery, Responder};

mod common;

fn echo_gateway() -> Gateway {
    let mut gateway = common::default_gateway();
    gateway
        .register("/echo*", |query: RequestQuery, _body: JsonObject, responder: Responder| {
            responder.ok(query.parameters_json());
        })
        .register("/body", |_query: RequestQuery, body: JsonObject, responder: Responder| {
            responder.ok(json!({ "received": body }));
        })
        .register("/delay", |query: RequestQuery, _body: JsonObject, responder: Responder| {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(300)).await;
                responder.respond(json!({ "path": query.path }), StatusCode::ACCEPTED);
            });
        });
    gateway
}

#[tokio::test]
async fn test_echo_query_parameters() {
    let (addr, shutdown) = common::start_gateway(echo_gateway()).await;

    let res = common::client()
        .get(format!("http://{}/echo?a=1&a=2", addr))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.headers()["connection"], "close");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"a": ["1", "2"]}));

    shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_body_still_invokes_handler() {
    let (addr, shutdown) = common::start_gateway(echo_gateway()).await;

    let res = common::client()
        .post(format!("http://{}/body/", addr))
        .body("{\"unterminated\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"received": {}}));

    shutdown.trigger();
}

#[tokio::test]
async fn test_json_body_reaches_handler() {
    let (addr, shutdown) = common::start_gateway(echo_gateway()).await;

    let res = common::client()
        .post(format!("http://{}/body", addr))
        .json(&json!({"user": 7}))
        .send()
        .await
        .unwrap();

    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"received": {"user": 7}}));

    shutdown.trigger();
}

#[tokio::test]
async fn test_delayed_response() {
    let (addr, shutdown) = common::start_gateway(echo_gateway()).await;

    let start = Instant::now();
    let res = common::client()
        .get(format!("http://{}/delay", addr))
        .send()
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_millis(300));
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"path": "/delay"}));

    shutdown.trigger();
}

#[tokio::test]
async fn test_missing_everything_is_404() {
    let (addr, shutdown) = common::start_gateway(echo_gateway()).await;

    let res = common::client()
        .get(format!("http://{}/missing", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.headers().get("content-type").is_none());
    assert!(res.bytes().await.unwrap().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_static_files_with_index_fallback() {
    let site = tempfile::tempdir().unwrap();
    std::fs::write(site.path().join("index.html"), "<h1>app</h1>").unwrap();
    std::fs::create_dir(site.path().join("js")).unwrap();
    std::fs::write(site.path().join("js/app.js"), "start();").unwrap();

    let mut config = GatewayConfig::default();
    config.assets.root = Some(site.path().to_string_lossy().into_owned());
    let (addr, shutdown) = common::start_gateway(Gateway::new(config)).await;
    let client = common::client();

    let res = client.get(format!("http://{}/js/app.js", addr)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/javascript");
    assert_eq!(res.text().await.unwrap(), "start();");

    let res = client.get(format!("http://{}/some/client/route", addr)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/html");
    assert_eq!(res.text().await.unwrap(), "<h1>app</h1>");

    let res = client.get(format!("http://{}/", addr)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "<h1>app</h1>");

    shutdown.trigger();
}

#[tokio::test]
async fn test_directory_before_programmatic_source() {
    let site = tempfile::tempdir().unwrap();
    std::fs::write(site.path().join("shared.css"), "from-disk").unwrap();

    let mut gateway = common::default_gateway();
    gateway
        .add_source(DirectorySource::new(site.path()))
        .add_source(FnSource::new(|path: &str| match path {
            "/shared.css" => Some(Bytes::from_static(b"from-fn")),
            "/generated.css" => Some(Bytes::from_static(b"generated")),
            _ => None,
        }));
    let (addr, shutdown) = common::start_gateway(gateway).await;
    let client = common::client();

    let res = client.get(format!("http://{}/shared.css", addr)).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "from-disk");

    let res = client.get(format!("http://{}/generated.css", addr)).send().await.unwrap();
    assert_eq!(res.headers()["content-type"], "text/css");
    assert_eq!(res.text().await.unwrap(), "generated");

    let res = client.get(format!("http://{}/nope.css", addr)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
}

#[tokio::test]
async fn test_route_precedence_over_assets() {
    let site = tempfile::tempdir().unwrap();
    std::fs::write(site.path().join("echo"), "file").unwrap();

    let mut gateway = echo_gateway();
    gateway.add_source(DirectorySource::new(site.path()));
    let (addr, shutdown) = common::start_gateway(gateway).await;

    let res = common::client().get(format!("http://{}/echo", addr)).send().await.unwrap();
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.json::<Value>().await.unwrap(), json!({}));

    shutdown.trigger();
}
