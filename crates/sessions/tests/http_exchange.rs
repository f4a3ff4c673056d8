//! Exchanges against an in-process axum server through the real HTTP
//! backend.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use rc_backend::HttpBackend;
use rc_domain::config::{BackendConfig, ChatConfig, FramingMode};
use rc_domain::{Error, Role};
use rc_sessions::ChatSession;
use tokio::net::TcpListener;

async fn list_kbs() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "knowledge_bases": ["docs"] }))
}

async fn qa_ok() -> impl IntoResponse {
    let parts = vec![
        "data: {\"type\": \"context\", \"chunks\": [\"alpha\"]}\n\n",
        "Answer[]",
    ];
    let stream = futures_util::stream::iter(parts).map(|s| Ok::<_, Infallible>(s.to_string()));
    Body::from_stream(stream)
}

async fn qa_down() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "detail": "vector index offline" })),
    )
}

async fn spawn_backend() -> SocketAddr {
    let app = Router::new()
        .route("/api/strategies/semantic-similarity/knowledge-bases", get(list_kbs))
        .route("/api/strategies/semantic-similarity/qa", post(qa_ok))
        .route("/api/strategies/down/knowledge-bases", get(list_kbs))
        .route("/api/strategies/down/qa", post(qa_down));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn session(addr: SocketAddr, strategy: &str) -> ChatSession {
    let backend = HttpBackend::new(&BackendConfig {
        base_url: format!("http://{addr}"),
        strategy: strategy.into(),
        ..BackendConfig::default()
    })
    .unwrap();
    let chat = ChatConfig {
        framing: FramingMode::Delimited,
        ..ChatConfig::default()
    };
    let mut session = ChatSession::new(Arc::new(backend), &chat);
    session.load_knowledge_bases().await.unwrap();
    session
}

#[tokio::test]
async fn server_error_keeps_only_the_user_turn() {
    let addr = spawn_backend().await;
    let mut session = session(addr, "down").await;

    let mut handle = session.submit("q").unwrap();
    let err = session.drive(&mut handle, |_, _| {}).await.unwrap_err();

    assert!(err.is_retryable());
    match err {
        Error::Backend { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "vector index offline");
        }
        other => panic!("expected backend error, got {other:?}"),
    }

    let turns = session.transcript().all();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[1].role(), Role::User);
    assert!(!session.is_busy());
}

#[tokio::test]
async fn streamed_answer_is_appended() {
    let addr = spawn_backend().await;
    let mut session = session(addr, "semantic-similarity").await;

    let mut handle = session.submit("q").unwrap();
    session.drive(&mut handle, |_, _| {}).await.unwrap();

    let last = session.transcript().last().unwrap();
    assert_eq!(last.role(), Role::Assistant);
    assert_eq!(last.content(), "Answer[]");
    assert_eq!(last.context_chunks(), Some(&["alpha".to_string()][..]));
}
