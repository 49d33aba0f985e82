//! Embedding request and response types.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/embeddings`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub prompt: String,
}

impl EmbeddingRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmbeddingResponse {
    #[serde(default)]
    pub embedding: Vec<f32>,
}
