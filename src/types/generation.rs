//! Generation request types.

use bon::Builder;

use super::image::ImageInput;

/// One call to the local generation endpoint.
///
/// Immutable once built; the streaming flag is a wire detail and is always
/// sent as `true`.
///
/// ```
/// use localgen::types::GenerationRequest;
///
/// let request = GenerationRequest::builder()
///     .model("llama3.2")
///     .prompt("Name three rivers.")
///     .build();
/// assert!(request.images().is_empty());
/// ```
#[derive(Debug, Clone, Builder, PartialEq)]
#[builder(on(String, into))]
pub struct GenerationRequest {
    model: String,
    prompt: String,
    /// Base64-encoded images, in order.
    #[builder(default)]
    images: Vec<String>,
    system: Option<String>,
    /// Raw model options (`temperature`, `num_ctx`, ...), passed through.
    options: Option<serde_json::Value>,
}

impl GenerationRequest {
    /// Text-only request.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            images: Vec::new(),
            system: None,
            options: None,
        }
    }

    /// Attach images, encoding raw bytes as needed.
    pub fn with_images(mut self, images: impl IntoIterator<Item = ImageInput>) -> Self {
        self.images
            .extend(images.into_iter().map(|image| image.to_base64()));
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    pub fn options(&self) -> Option<&serde_json::Value> {
        self.options.as_ref()
    }
}
