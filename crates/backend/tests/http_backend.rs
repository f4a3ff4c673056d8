//! Integration test: boots an in-process axum server that stands in for
//! the QA backend and drives a real [`HttpBackend`] against it.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use parking_lot::Mutex;
use rc_backend::{HttpBackend, QaBackend, QaRequest};
use rc_domain::config::BackendConfig;
use rc_domain::{Error, Turn};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Captured {
    bodies: Arc<Mutex<Vec<serde_json::Value>>>,
}

async fn list_kbs() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "knowledge_bases": ["产品手册", "FAQ"] }))
}

async fn qa(State(cap): State<Captured>, Json(body): Json<serde_json::Value>) -> impl IntoResponse {
    cap.bodies.lock().push(body);
    let parts = vec![
        "data: {\"type\": \"context\", \"chunks\": [\"段落A\", \"段落B\"]}\n\n",
        "第一部分",
        "，第二部分[]",
    ];
    let stream = futures_util::stream::iter(parts).map(|s| Ok::<_, Infallible>(s.to_string()));
    Body::from_stream(stream)
}

async fn qa_empty() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

async fn qa_fails() -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "detail": "knowledge_base_name is required" })),
    )
}

async fn spawn_backend() -> (SocketAddr, Captured) {
    let captured = Captured::default();
    let app = Router::new()
        .route("/api/strategies/semantic-similarity/knowledge-bases", get(list_kbs))
        .route("/api/strategies/semantic-similarity/qa", post(qa))
        .route("/api/strategies/empty/qa", post(qa_empty))
        .route("/api/strategies/broken/qa", post(qa_fails))
        .route(
            "/api/strategies/broken/knowledge-bases",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "db down") }),
        )
        .route(
            "/api/strategies/unset/knowledge-bases",
            get(|| async { Json(serde_json::json!({ "knowledge_bases": null })) }),
        )
        .with_state(captured.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, captured)
}

fn backend(addr: SocketAddr, strategy: &str) -> HttpBackend {
    HttpBackend::new(&BackendConfig {
        base_url: format!("http://{addr}"),
        strategy: strategy.into(),
        ..BackendConfig::default()
    })
    .unwrap()
}

fn request() -> QaRequest {
    QaRequest {
        messages: vec![Turn::system("cite with []"), Turn::user("总结一下")],
        knowledge_base_name: "产品手册".into(),
    }
}

async fn read_all(mut body: rc_domain::stream::ByteStream) -> String {
    let mut bytes = Vec::new();
    while let Some(chunk) = body.next().await {
        bytes.extend(chunk.unwrap());
    }
    String::from_utf8(bytes).unwrap()
}

#[tokio::test]
async fn lists_knowledge_bases_in_order() {
    let (addr, _) = spawn_backend().await;
    let kbs = backend(addr, "semantic-similarity").knowledge_bases().await.unwrap();
    assert_eq!(kbs, vec!["产品手册".to_string(), "FAQ".to_string()]);
}

#[tokio::test]
async fn null_directory_is_empty() {
    let (addr, _) = spawn_backend().await;
    let kbs = backend(addr, "unset").knowledge_bases().await.unwrap();
    assert!(kbs.is_empty());
}

#[tokio::test]
async fn ask_posts_transcript_and_streams_body() {
    let (addr, captured) = spawn_backend().await;
    let body = backend(addr, "semantic-similarity").ask(&request()).await.unwrap();

    let text = read_all(body).await;
    assert!(text.starts_with("data: {\"type\": \"context\""));
    assert!(text.ends_with("第一部分，第二部分[]"));

    let bodies = captured.bodies.lock();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["knowledge_base_name"], "产品手册");
    assert_eq!(
        bodies[0]["messages"],
        serde_json::json!([
            { "role": "system", "content": "cite with []" },
            { "role": "user", "content": "总结一下" },
        ])
    );
}

#[tokio::test]
async fn no_content_is_stream_unavailable() {
    let (addr, _) = spawn_backend().await;
    let err = backend(addr, "empty").ask(&request()).await.err().unwrap();
    assert!(matches!(err, Error::StreamUnavailable), "got {err:?}");
}

#[tokio::test]
async fn error_status_carries_detail() {
    let (addr, _) = spawn_backend().await;
    let err = backend(addr, "broken").ask(&request()).await.err().unwrap();
    match err {
        Error::Backend { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "knowledge_base_name is required");
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn directory_failure_is_backend_error() {
    let (addr, _) = spawn_backend().await;
    let err = backend(addr, "broken").knowledge_bases().await.unwrap_err();
    assert!(matches!(err, Error::Backend { status: 500, .. }), "got {err:?}");
}

#[tokio::test]
async fn unreachable_backend_is_http_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = {
        let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap()
    };
    let err = backend(addr, "semantic-similarity").knowledge_bases().await.unwrap_err();
    assert!(matches!(err, Error::Http(_) | Error::Timeout(_)), "got {err:?}");
}
