//! HTTP transport for OpenRouter's chat-completions endpoint.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::transport::{ChatRequest, ChatResponse, CompletionTransport};

/// reqwest-backed transport with bearer auth and an app title header.
pub struct OpenRouterTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    app_title: String,
}

impl OpenRouterTransport {
    /// `endpoint` is the full chat-completions URL; a trailing slash is dropped.
    pub fn new(endpoint: &str, api_key: String, app_title: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            app_title,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionTransport for OpenRouterTransport {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        info!(url = %self.endpoint, model = %request.model, "sending completion request");
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("X-Title", &self.app_title)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)?;
        if let Some(usage) = &parsed.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion usage"
            );
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ContentPart, Message};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned reply on a local port. The handle yields the raw
    /// request text.
    async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api/v1/chat/completions", listener.local_addr().unwrap());
        let reply = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                if request_complete(&raw) {
                    break;
                }
            }
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&raw).into_owned()
        });
        (url, handle)
    }

    /// Headers received and the body matches its Content-Length.
    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(split) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..split]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= split + 4 + length
    }

    fn request() -> ChatRequest {
        ChatRequest {
            model: "openai/gpt-4o".into(),
            messages: vec![Message::user(vec![ContentPart::text("hi")])],
            max_tokens: 16,
            temperature: 0.0,
            response_format: None,
        }
    }

    fn transport(url: &str) -> OpenRouterTransport {
        OpenRouterTransport::new(url, "test-key".into(), "K-1 Tax Form Extraction".into())
    }

    #[tokio::test]
    async fn error_status_is_server_error() {
        let (url, server) = serve_once("502 Bad Gateway", "upstream down").await;
        let err = transport(&url).complete(&request()).await.unwrap_err();
        server.await.unwrap();

        match err {
            TransportError::Server { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream down");
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreadable_envelope_is_json_error() {
        let (url, server) = serve_once("200 OK", "<html>not json</html>").await;
        let err = transport(&url).complete(&request()).await.unwrap_err();
        server.await.unwrap();
        assert!(matches!(err, TransportError::Json(_)));
    }

    #[tokio::test]
    async fn request_carries_auth_and_title() {
        let envelope = r#"{"choices":[{"message":{"content":"{}"}}],"usage":{"prompt_tokens":3,"completion_tokens":1}}"#;
        let (url, server) = serve_once("200 OK", envelope).await;
        let response = transport(&url).complete(&request()).await.unwrap();
        let raw = server.await.unwrap();

        assert_eq!(response.first_content(), Some("{}"));
        let lower = raw.to_ascii_lowercase();
        assert!(lower.starts_with("post /api/v1/chat/completions"));
        assert!(lower.contains("authorization: bearer test-key"));
        assert!(lower.contains("x-title: k-1 tax form extraction"));
        assert!(raw.contains(r#""model":"openai/gpt-4o""#));
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let transport = OpenRouterTransport::new(
            "https://openrouter.ai/api/v1/chat/completions/",
            "key".into(),
            "title".into(),
        );
        assert_eq!(
            transport.endpoint(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }
}
