//! Convenience re-exports for common use.

pub use crate::config::LocalGenConfig;
pub use crate::error::{LocalGenError, Result};
pub use crate::generation::StreamingGenerator;
pub use crate::models::{CapabilitySet, CapabilityTag, ModelCapabilityClassifier};
pub use crate::provider::{ModelService, OllamaService};
pub use crate::types::{
    ChatMessage, ChatRequest, GenerationFragment, GenerationRequest, ImageInput, ModelDescriptor,
};
pub use tokio_util::sync::CancellationToken;
