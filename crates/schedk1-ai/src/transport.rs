//! Chat-completion wire types and the transport seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Chat-completion request body (OpenAI-compatible).
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            kind: "json_object".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentPart>,
}

impl Message {
    pub fn user(content: Vec<ContentPart>) -> Self {
        Self {
            role: "user".into(),
            content,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    File { file: FilePart },
}

#[derive(Debug, Clone, Serialize)]
pub struct FilePart {
    pub filename: String,
    pub file_data: String,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Inline PDF part carrying a base64 payload as a data URL.
    pub fn pdf(filename: impl Into<String>, base64_pdf: &str) -> Self {
        Self::File {
            file: FilePart {
                filename: filename.into(),
                file_data: format!("data:application/pdf;base64,{base64_pdf}"),
            },
        }
    }
}

/// Chat-completion response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

impl ChatResponse {
    /// `choices[0].message.content`, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref()
    }

    /// Response carrying a single assistant message.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                message: ResponseMessage {
                    content: Some(content.into()),
                },
            }],
            usage: None,
        }
    }
}

/// Sends one chat-completion request.
///
/// Implementations fail only for transport-level problems: the network,
/// a non-success status, or an unreadable envelope.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serialises_with_tagged_parts() {
        let request = ChatRequest {
            model: "anthropic/claude-3.5-sonnet".into(),
            messages: vec![Message::user(vec![
                ContentPart::text("hello"),
                ContentPart::pdf("document.pdf", "QUJD"),
            ])],
            max_tokens: 16000,
            temperature: 0.1,
            response_format: Some(ResponseFormat::json_object()),
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["response_format"], json!({"type": "json_object"}));
        let content = &value["messages"][0]["content"];
        assert_eq!(content[0], json!({"type": "text", "text": "hello"}));
        assert_eq!(
            content[1],
            json!({
                "type": "file",
                "file": {
                    "filename": "document.pdf",
                    "file_data": "data:application/pdf;base64,QUJD"
                }
            })
        );
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn response_content_is_optional() {
        let resp: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "{}"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2}
        }))
        .unwrap();
        assert_eq!(resp.first_content(), Some("{}"));
        assert_eq!(resp.usage.unwrap().completion_tokens, 2);

        let empty: ChatResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.first_content(), None);

        let null: ChatResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert_eq!(null.first_content(), None);
    }
}
