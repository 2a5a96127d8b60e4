//! Request client for the chat backend.
//!
//! One call is one `POST {base}/chat` carrying `{ message, provider }`. HTTP
//! error statuses and unusable bodies are folded into a displayable
//! [`ChatReply`]; only transport failures surface as [`ClientError`].

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::Provider;

/// Shown when a success body carries no usable `response`.
pub const EMPTY_REPLY: &str = "(No response content)";

#[derive(Debug, Error)]
pub enum ClientError {
    /// No response was obtained (connect, send or body read failed).
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The task driving the request ended without producing a result.
    #[error("request task did not complete: {0}")]
    Task(String),
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    provider: Provider,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    response: Option<String>,
}

/// How a settled request produced its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Answer,
    HttpStatus(u16),
    Empty,
}

/// Displayable outcome of a request that got a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub content: String,
    pub kind: ReplyKind,
}

impl ChatReply {
    pub fn answer(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: ReplyKind::Answer,
        }
    }

    pub fn http_status(status: u16) -> Self {
        Self {
            content: format!("Server error: {}", status),
            kind: ReplyKind::HttpStatus(status),
        }
    }

    pub fn empty() -> Self {
        Self {
            content: EMPTY_REPLY.to_string(),
            kind: ReplyKind::Empty,
        }
    }

    /// Interpret a 2xx body. Anything other than a non-empty string
    /// `response` field becomes the placeholder.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<ChatResponse>(body) {
            Ok(ChatResponse {
                response: Some(text),
            }) if !text.is_empty() => Self::answer(text),
            Ok(_) => Self::empty(),
            Err(err) => {
                tracing::warn!(%err, "chat response body was not the expected JSON");
                Self::empty()
            }
        }
    }
}

/// Anything that can answer a single chat turn.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, message: &str, provider: Provider) -> Result<ChatReply, ClientError>;
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn send(&self, message: &str, provider: Provider) -> Result<ChatReply, ClientError> {
        let url = self.endpoint();
        let request = ChatRequest { message, provider };

        tracing::debug!(%url, %provider, chars = message.chars().count(), "sending chat request");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "chat backend returned an error status");
            return Ok(ChatReply::http_status(status.as_u16()));
        }

        let body = response.text().await?;
        let reply = ChatReply::from_body(&body);
        tracing::debug!(kind = ?reply.kind, "chat request settled");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            message: "How do I fix my ice maker?",
            provider: Provider::DeepSeek,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"message": "How do I fix my ice maker?", "provider": "deepseek"})
        );
    }

    #[test]
    fn test_body_with_response() {
        assert_eq!(ChatReply::from_body(r#"{"response": "Hello"}"#), ChatReply::answer("Hello"));
    }

    #[test]
    fn test_body_without_usable_response() {
        for body in [
            r#"{}"#,
            r#"{"response": null}"#,
            r#"{"response": ""}"#,
            r#"{"response": 42}"#,
            "<html>oops</html>",
            "",
        ] {
            assert_eq!(ChatReply::from_body(body), ChatReply::empty(), "body: {body}");
        }
    }

    #[test]
    fn test_http_status_text_embeds_code() {
        let reply = ChatReply::http_status(502);
        assert_eq!(reply.content, "Server error: 502");
        assert_eq!(reply.kind, ReplyKind::HttpStatus(502));
    }

    #[test]
    fn test_endpoint_has_single_slash() {
        let client = ChatClient::new("http://127.0.0.1:8000/");
        assert_eq!(client.endpoint(), "http://127.0.0.1:8000/chat");
    }
}
