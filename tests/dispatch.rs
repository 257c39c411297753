//! End-to-end dispatch against a live local target.
//!
//! Starts an axum app on a random port and runs batches through the real
//! reqwest transport, including a target whose port is closed.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use api_dispatcher::{
    server, Batch, ClientConfig, DispatchConfig, Dispatched, Dispatcher, Outcome, ReportOrder, ReqwestTransport,
    ServerConfig, Stage,
};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use serde_json::Value;
use tokio::net::TcpListener;

fn target_app() -> Router {
    Router::new()
        .route("/ok", get(|| async { "hello" }))
        .route("/echo", post(|Json(body): Json<Value>| async move { Json(body) }))
        .route(
            "/header",
            get(|headers: HeaderMap| async move {
                headers
                    .get("x-probe")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("missing")
                    .to_string()
            }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(std::time::Duration::from_secs(2)).await;
                "late"
            }),
        )
}

async fn spawn_target() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, target_app()).await.unwrap() });
    addr
}

/// An address nothing listens on.
fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

fn dispatcher(config: DispatchConfig) -> Dispatcher {
    let client = ClientConfig::default().build_client().unwrap();
    Dispatcher::new(Arc::new(ReqwestTransport::new(client)), &config)
}

async fn run(batch: &Batch, config: DispatchConfig) -> Vec<Dispatched> {
    dispatcher(config).dispatch_reported(&batch.requests).collect().await
}

#[tokio::test]
async fn reachable_and_refused_targets() {
    let live = spawn_target().await;
    let dead = closed_addr();
    let batch = Batch::from_slice(
        format!(
            r#"{{"requests":[
                {{"url":"http://{live}/ok","method":"GET"}},
                {{"url":"http://{dead}/down","method":"GET"}}
            ]}}"#
        )
        .as_bytes(),
    )
    .unwrap();

    let outcomes = run(&batch, DispatchConfig::default().with_order(ReportOrder::Submission)).await;
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].to_string(), format!("Response from http://{live}/ok: hello"));

    let line = outcomes[1].to_string();
    assert!(
        line.starts_with(&format!("Error transmission for http://{dead}/down: ")),
        "unexpected line: {line}"
    );
}

#[tokio::test]
async fn post_body_arrives_as_json() {
    let live = spawn_target().await;
    let batch = Batch::from_slice(
        format!(r#"{{"requests":[{{"url":"http://{live}/echo","method":"POST","body":{{"title":"foo"}}}}]}}"#)
            .as_bytes(),
    )
    .unwrap();

    let outcomes = run(&batch, DispatchConfig::default()).await;
    let Outcome::Success { status, body, .. } = &outcomes[0].outcome else {
        panic!("expected success, got {}", outcomes[0]);
    };
    assert_eq!(*status, 200);
    let echoed: HashMap<String, String> = serde_json::from_str(body).unwrap();
    assert_eq!(echoed, HashMap::from([("title".to_string(), "foo".to_string())]));
}

#[tokio::test]
async fn headers_are_transmitted() {
    let live = spawn_target().await;
    let batch = Batch::from_slice(
        format!(r#"{{"requests":[{{"url":"http://{live}/header","method":"GET","headers":{{"X-Probe":"2"}}}}]}}"#)
            .as_bytes(),
    )
    .unwrap();

    let outcomes = run(&batch, DispatchConfig::default()).await;
    assert_eq!(outcomes[0].to_string(), format!("Response from http://{live}/header: 2"));
}

#[tokio::test]
async fn per_request_timeout_is_a_transmission_failure() {
    let live = spawn_target().await;
    let batch = Batch::from_slice(
        format!(
            r#"{{"requests":[
                {{"url":"http://{live}/slow","method":"GET","timeout":0.2}},
                {{"url":"http://{live}/ok","method":"GET"}}
            ]}}"#
        )
        .as_bytes(),
    )
    .unwrap();

    let outcomes = run(&batch, DispatchConfig::default().with_order(ReportOrder::Submission)).await;
    assert!(matches!(
        outcomes[0].outcome,
        Outcome::Failure { stage: Stage::Transmission, .. }
    ));
    assert!(outcomes[1].outcome.is_success());
}

#[tokio::test]
async fn non_2xx_responses_are_still_responses() {
    let live = spawn_target().await;
    let batch = Batch::from_slice(
        format!(r#"{{"requests":[{{"url":"http://{live}/missing","method":"GET"}}]}}"#).as_bytes(),
    )
    .unwrap();

    let outcomes = run(&batch, DispatchConfig::default()).await;
    let Outcome::Success { status, .. } = &outcomes[0].outcome else {
        panic!("expected success, got {}", outcomes[0]);
    };
    assert_eq!(*status, 404);
}

#[tokio::test]
async fn server_streams_outcomes_over_http() {
    let live = spawn_target().await;

    let listener = server::bind("127.0.0.1:0").await.unwrap();
    let server_addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let app = server::app(dispatcher(DispatchConfig::default()), &ServerConfig::default());
    let handle = tokio::spawn(server::serve(listener, app, async move {
        let _ = stop_rx.await;
    }));

    let client = reqwest::Client::new();
    let body = format!(
        r#"{{"requests":[
            {{"url":"http://{live}/ok","method":"GET"}},
            {{"url":"not a url","method":"GET"}}
        ]}}"#
    );
    let resp = client
        .post(format!("http://{server_addr}/"))
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let text = resp.text().await.unwrap();
    let mut lines: Vec<&str> = text.lines().collect();
    lines.sort();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Error request-construction for not a url: "));
    assert_eq!(lines[1], format!("Response from http://{live}/ok: hello"));

    let resp = client.get(format!("http://{server_addr}/")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 405);
    drop(client);

    stop_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();
}
