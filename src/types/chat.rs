//! Chat request and message types for `/api/chat`.

use bon::Builder;
use serde::{Deserialize, Serialize};

use super::image::ImageInput;

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

/// One turn of a conversation, in the service's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[serde(default)]
    pub content: String,
    /// Base64-encoded images attached to this turn.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            images: Vec::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    /// Attach images, encoding raw bytes as needed.
    pub fn with_images(mut self, images: impl IntoIterator<Item = ImageInput>) -> Self {
        self.images
            .extend(images.into_iter().map(|image| image.to_base64()));
        self
    }
}

/// One call to the local chat endpoint. Streams like a generation.
#[derive(Debug, Clone, Builder, PartialEq)]
#[builder(on(String, into))]
pub struct ChatRequest {
    model: String,
    #[builder(default)]
    messages: Vec<ChatMessage>,
    options: Option<serde_json::Value>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: None,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn options(&self) -> Option<&serde_json::Value> {
        self.options.as_ref()
    }
}
