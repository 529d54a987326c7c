use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use apex_gateway::{
    build_signed_gateway_router, SignedGatewayConfig, SignedGatewayState, AGENT_INVOKE_ENDPOINT,
    AGENT_PARTNER_ENDPOINT, AGENT_SEARCH_ENDPOINT, AGENT_STREAM_ENDPOINT, AGENT_TASKS_ENDPOINT,
};
use apex_signing::{SignatureVerifier, HEADER_SIGNATURE, HEADER_TIMESTAMP};
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use serde_json::{json, Value};
use tokio::net::TcpListener;

const SHARED_SECRET: &str = "integration-secret";

/// Mirrors the agent service contract: every route rejects unsigned or stale calls.
fn agent_service_stub() -> Router {
    let verifier = Arc::new(SignatureVerifier::new(SHARED_SECRET).expect("verifier"));
    Router::new()
        .route("/memory/search", post(stub_search))
        .route("/invoke", post(stub_invoke))
        .route("/partner", post(stub_partner))
        .route("/tasks", get(stub_tasks))
        .route("/stream", post(stub_stream))
        .with_state(verifier)
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn verify(verifier: &SignatureVerifier, headers: &HeaderMap, body: &[u8]) -> Result<Value, Response> {
    verifier
        .verify(
            header_text(headers, HEADER_TIMESTAMP),
            header_text(headers, HEADER_SIGNATURE),
            body,
        )
        .map_err(|error| (StatusCode::UNAUTHORIZED, error.to_string()).into_response())?;
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|error| (StatusCode::UNPROCESSABLE_ENTITY, error.to_string()).into_response())
}

async fn stub_search(
    State(verifier): State<Arc<SignatureVerifier>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match verify(&verifier, &headers, &body) {
        Ok(payload) => Json(json!({
            "results": [{"text": format!("memory about {}", payload["q"].as_str().unwrap_or_default())}],
            "limit": payload["limit"],
        }))
        .into_response(),
        Err(rejection) => rejection,
    }
}

async fn stub_invoke(
    State(verifier): State<Arc<SignatureVerifier>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match verify(&verifier, &headers, &body) {
        Ok(payload) => Json(json!({
            "output": format!(
                "{} -> {}",
                payload["model"].as_str().unwrap_or_default(),
                payload["prompt"].as_str().unwrap_or_default()
            ),
        }))
        .into_response(),
        Err(rejection) => rejection,
    }
}

async fn stub_partner(
    State(verifier): State<Arc<SignatureVerifier>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match verify(&verifier, &headers, &body) {
        Ok(payload) => Json(json!({
            "accepted": payload["instruction"],
            "steps": ["plan", "execute"],
        }))
        .into_response(),
        Err(rejection) => rejection,
    }
}

async fn stub_tasks(State(verifier): State<Arc<SignatureVerifier>>, headers: HeaderMap) -> Response {
    match verify(&verifier, &headers, b"") {
        Ok(_) => Json(json!({"tasks": [{"id": 7, "status": "pending"}]})).into_response(),
        Err(rejection) => rejection,
    }
}

async fn stub_stream(
    State(verifier): State<Arc<SignatureVerifier>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload = match verify(&verifier, &headers, &body) {
        Ok(payload) => payload,
        Err(rejection) => return rejection,
    };
    let prompt = payload["prompt"].as_str().unwrap_or_default().to_string();
    let frames = vec![
        format!("data: {{\"response\":\"{prompt}\"}}\n"),
        "data: {\"response\":\"!\"}\n".to_string(),
        "data: {\"done\":true}\n".to_string(),
    ];
    let chunks = futures_util::stream::iter(frames).then(|frame| async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok::<_, Infallible>(Bytes::from(frame))
    });
    let mut response = Response::new(Body::from_stream(chunks));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    response
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    addr
}

async fn spawn_gateway(agent_addr: SocketAddr, shared_secret: &str) -> SocketAddr {
    let state = SignedGatewayState::from_config(&SignedGatewayConfig {
        bind: "127.0.0.1:0".to_string(),
        upstream_base_url: format!("http://{agent_addr}"),
        shared_secret: shared_secret.to_string(),
        default_model: "llama3".to_string(),
        request_timeout_ms: 5_000,
        stream_connect_timeout_ms: 5_000,
        allow_insecure_secret: false,
    })
    .expect("gateway state");
    spawn(build_signed_gateway_router(Arc::new(state))).await
}

#[tokio::test]
async fn integration_every_route_round_trips_through_verifying_agent_service() {
    let agent_addr = spawn(agent_service_stub()).await;
    let gateway_addr = spawn_gateway(agent_addr, SHARED_SECRET).await;
    let client = reqwest::Client::new();
    let url = |path: &str| format!("http://{gateway_addr}{path}");

    let search: Value = client
        .post(url(AGENT_SEARCH_ENDPOINT))
        .json(&json!({"q": "lateral movement", "limit": 2}))
        .send()
        .await
        .expect("search")
        .json()
        .await
        .expect("search json");
    assert_eq!(search["results"][0]["text"], "memory about lateral movement");
    assert_eq!(search["limit"], 2);

    let invoke = client
        .post(url(AGENT_INVOKE_ENDPOINT))
        .json(&json!({"prompt": "summarize"}))
        .send()
        .await
        .expect("invoke");
    assert_eq!(invoke.status(), StatusCode::OK);
    let invoke: Value = invoke.json().await.expect("invoke json");
    assert_eq!(invoke, json!({"output": "llama3 -> summarize"}));

    let partner: Value = client
        .post(url(AGENT_PARTNER_ENDPOINT))
        .json(&json!({"instruction": "audit cron jobs"}))
        .send()
        .await
        .expect("partner")
        .json()
        .await
        .expect("partner json");
    assert_eq!(partner["accepted"], "audit cron jobs");

    let tasks: Value = client
        .get(url(AGENT_TASKS_ENDPOINT))
        .send()
        .await
        .expect("tasks")
        .json()
        .await
        .expect("tasks json");
    assert_eq!(tasks, json!({"tasks": [{"id": 7, "status": "pending"}]}));

    let stream = client
        .get(url(AGENT_STREAM_ENDPOINT))
        .query(&[("prompt", "ping")])
        .send()
        .await
        .expect("stream");
    assert_eq!(stream.status(), StatusCode::OK);
    assert_eq!(
        stream
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("text/event-stream")
    );
    let body = stream.text().await.expect("stream body");
    assert_eq!(
        body,
        "data: {\"response\":\"ping\"}\ndata: {\"response\":\"!\"}\ndata: {\"done\":true}\n"
    );
}

#[tokio::test]
async fn regression_secret_mismatch_surfaces_as_bad_gateway() {
    let agent_addr = spawn(agent_service_stub()).await;
    let gateway_addr = spawn_gateway(agent_addr, "wrong-secret").await;

    let response = reqwest::Client::new()
        .post(format!("http://{gateway_addr}{AGENT_INVOKE_ENDPOINT}"))
        .json(&json!({"prompt": "hi"}))
        .send()
        .await
        .expect("invoke");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.expect("error json");
    let message = body["error"].as_str().expect("error string");
    assert!(message.contains("401"), "message: {message}");
    assert!(message.contains("signature verification failed"), "message: {message}");

    let stream = reqwest::Client::new()
        .get(format!("http://{gateway_addr}{AGENT_STREAM_ENDPOINT}?prompt=hi"))
        .send()
        .await
        .expect("stream");
    assert_eq!(stream.status(), StatusCode::BAD_GATEWAY);
    let body: Value = stream.json().await.expect("stream error json");
    assert!(body["error"].is_string());
}
