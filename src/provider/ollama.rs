//! Ollama native API client (`/api/tags`, `/api/generate`, `/api/chat`,
//! `/api/embeddings`, `/api/show`).

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::config::LocalGenConfig;
use crate::error::LocalGenError;
use crate::types::model::ShowResponse;
use crate::types::{
    ChatMessage, ChatRequest, EmbeddingRequest, EmbeddingResponse, FragmentStream,
    GenerationRequest, InstalledModel, ModelInfo, TagsResponse,
};
use crate::util::timeout::with_timeout;

use super::http::{build_client, check_status, ndjson_fragments};
use super::ModelService;

/// Wire body of `POST /api/generate`.
#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    images: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a serde_json::Value>,
    stream: bool,
}

impl<'a> From<&'a GenerationRequest> for GenerateBody<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            model: request.model(),
            prompt: request.prompt(),
            images: request.images(),
            system: request.system(),
            options: request.options(),
            stream: true,
        }
    }
}

/// Wire body of `POST /api/chat`.
#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a serde_json::Value>,
    stream: bool,
}

impl<'a> From<&'a ChatRequest> for ChatBody<'a> {
    fn from(request: &'a ChatRequest) -> Self {
        Self {
            model: request.model(),
            messages: request.messages(),
            options: request.options(),
            stream: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct ShowBody<'a> {
    model: &'a str,
}

/// HTTP client for a local Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaService {
    config: LocalGenConfig,
    client: reqwest::Client,
}

impl OllamaService {
    pub fn new(config: LocalGenConfig) -> Result<Self, LocalGenError> {
        config.validate()?;
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    /// Client for `base_url` with otherwise default settings.
    pub fn with_base_url(base_url: impl AsRef<str>) -> Result<Self, LocalGenError> {
        Self::new(LocalGenConfig::new().with_base_url(base_url))
    }

    pub fn config(&self) -> &LocalGenConfig {
        &self.config
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, LocalGenError> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| LocalGenError::unreachable(url, e))?;
        check_status(url, resp).await
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        url: &str,
        resp: reqwest::Response,
    ) -> Result<T, LocalGenError> {
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| LocalGenError::unreachable(url, e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl ModelService for OllamaService {
    fn endpoint(&self) -> &str {
        self.config.base_url()
    }

    async fn list_models(&self) -> Result<Vec<InstalledModel>, LocalGenError> {
        let url = self.config.tags_url();
        debug!(%url, "Ollama list_models");

        let fetch = async {
            let resp = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| LocalGenError::unreachable(&url, e))?;
            let resp = check_status(&url, resp).await?;
            Self::read_json::<TagsResponse>(&url, resp).await
        };
        let tags = with_timeout(self.config.list_timeout(), fetch).await?;
        Ok(tags.models)
    }

    async fn generate_stream(
        &self,
        request: &GenerationRequest,
    ) -> Result<FragmentStream, LocalGenError> {
        let url = self.config.generate_url();
        debug!(
            %url,
            model = request.model(),
            images = request.images().len(),
            "Ollama generate_stream"
        );

        let resp = self.send_json(&url, &GenerateBody::from(request)).await?;
        Ok(ndjson_fragments(url, resp.bytes_stream()))
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<FragmentStream, LocalGenError> {
        let url = self.config.chat_url();
        debug!(
            %url,
            model = request.model(),
            messages = request.messages().len(),
            "Ollama chat_stream"
        );

        let resp = self.send_json(&url, &ChatBody::from(request)).await?;
        Ok(ndjson_fragments(url, resp.bytes_stream()))
    }

    async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse, LocalGenError> {
        let url = self.config.embeddings_url();
        debug!(%url, model = %request.model, "Ollama embed");

        let resp = self.send_json(&url, request).await?;
        Self::read_json(&url, resp).await
    }

    async fn show_model(&self, name: &str) -> Result<ModelInfo, LocalGenError> {
        let url = self.config.show_url();
        debug!(%url, model = name, "Ollama show_model");

        let resp = self.send_json(&url, &ShowBody { model: name }).await?;
        let show: ShowResponse = Self::read_json(&url, resp).await?;
        Ok(show.into_info(name))
    }
}
