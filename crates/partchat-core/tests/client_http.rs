//! Request client against a throwaway local backend.

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use partchat_core::client::EMPTY_REPLY;
use partchat_core::conversation::REQUEST_FAILED;
use partchat_core::{ChatBackend, ChatClient, ChatReply, Conversation, Provider, ReplyKind};
use serde_json::{json, Value};

/// Serve `router` on an ephemeral port and return its base URL.
async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve test backend");
    });
    format!("http://{}", addr)
}

/// Echoes the request back so tests can assert on what was sent.
async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Json(json!({
        "response": format!(
            "{}|{}|{}",
            body["message"].as_str().unwrap_or_default(),
            body["provider"].as_str().unwrap_or_default(),
            content_type
        )
    }))
}

#[tokio::test]
async fn posts_message_and_provider_as_json() {
    let base = spawn_backend(Router::new().route("/chat", post(echo))).await;
    let client = ChatClient::new(&base);

    let reply = client
        .send("Is this part compatible?", Provider::DeepSeek)
        .await
        .expect("send");

    assert_eq!(reply.kind, ReplyKind::Answer);
    assert_eq!(reply.content, "Is this part compatible?|deepseek|application/json");
}

#[tokio::test]
async fn successful_reply_is_appended() {
    let router = Router::new().route("/chat", post(|| async { Json(json!({"response": "Hello"})) }));
    let base = spawn_backend(router).await;
    let client = ChatClient::new(&base);
    let mut conv = Conversation::default();

    assert!(conv.send(&client, "hi").await);

    assert_eq!(conv.messages().len(), 3);
    assert_eq!(conv.messages()[2].content, "Hello");
    assert!(!conv.is_sending());
}

#[tokio::test]
async fn server_error_status_is_a_soft_failure() {
    let router = Router::new().route(
        "/chat",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = spawn_backend(router).await;
    let client = ChatClient::new(&base);

    let reply = client.send("hi", Provider::OpenAI).await.expect("send");

    assert_eq!(reply, ChatReply::http_status(500));
    assert!(reply.content.contains("500"));
}

#[tokio::test]
async fn missing_route_reports_404() {
    let base = spawn_backend(Router::new()).await;
    let client = ChatClient::new(&base);
    let mut conv = Conversation::default();

    conv.send(&client, "hi").await;

    assert!(conv.messages()[2].content.contains("404"));
}

#[tokio::test]
async fn empty_and_malformed_bodies_use_placeholder() {
    let router = Router::new()
        .route("/empty/chat", post(|| async { Json(json!({"response": ""})) }))
        .route("/missing/chat", post(|| async { Json(json!({"answer": "wrong field"})) }))
        .route("/garbage/chat", post(|| async { "not json at all" }));
    let base = spawn_backend(router).await;

    for prefix in ["empty", "missing", "garbage"] {
        let client = ChatClient::new(&format!("{}/{}", base, prefix));
        let reply = client.send("hi", Provider::OpenAI).await.expect("send");
        assert_eq!(reply.kind, ReplyKind::Empty, "{prefix}");
        assert_eq!(reply.content, EMPTY_REPLY, "{prefix}");
    }
}

#[tokio::test]
async fn unreachable_backend_settles_with_generic_failure() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = ChatClient::new(&format!("http://{}", addr));
    assert!(client.send("hi", Provider::OpenAI).await.is_err());

    let mut conv = Conversation::default();
    assert!(conv.send(&client, "hi").await);
    assert_eq!(conv.messages()[2].content, REQUEST_FAILED);
    assert!(!conv.is_sending());
}
