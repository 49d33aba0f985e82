//! Model service trait and the Ollama implementation.

pub mod http;
pub mod ollama;

pub use ollama::OllamaService;

use async_trait::async_trait;

use crate::error::LocalGenError;
use crate::types::{
    ChatRequest, EmbeddingRequest, EmbeddingResponse, FragmentStream, GenerationRequest,
    InstalledModel, ModelInfo,
};

/// Client for a local model-serving endpoint.
///
/// Both the generator and the classifier talk to the service only through
/// this trait.
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Base URL this client talks to, for diagnostics.
    fn endpoint(&self) -> &str;

    /// Snapshot of the installed models.
    async fn list_models(&self) -> Result<Vec<InstalledModel>, LocalGenError>;

    /// Start a streaming generation. The returned stream yields one fragment
    /// per non-blank response line and ends when the connection closes.
    async fn generate_stream(
        &self,
        request: &GenerationRequest,
    ) -> Result<FragmentStream, LocalGenError>;

    /// Start a streaming chat. Fragments carry `message.content` deltas and
    /// decode exactly like a generation stream.
    async fn chat_stream(&self, request: &ChatRequest) -> Result<FragmentStream, LocalGenError>;

    /// Compute an embedding vector.
    async fn embed(&self, request: &EmbeddingRequest)
        -> Result<EmbeddingResponse, LocalGenError>;

    /// Detailed information about one model.
    async fn show_model(&self, name: &str) -> Result<ModelInfo, LocalGenError>;
}
