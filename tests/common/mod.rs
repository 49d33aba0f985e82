//! Shared test helpers and mock model service.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;

use localgen::error::LocalGenError;
use localgen::provider::http::ndjson_fragments;
use localgen::provider::ModelService;
use localgen::types::*;

/// How the mock answers `list_models`.
pub enum Listing {
    Models(Vec<InstalledModel>),
    Unavailable,
    TimedOut,
    Misconfigured,
}

/// A mock service that replays a scripted response body.
pub struct MockService {
    listing: Listing,
    chunks: Mutex<Vec<Vec<u8>>>,
    hang_after_body: bool,
    pub list_calls: AtomicUsize,
    pub requests: Mutex<Vec<GenerationRequest>>,
    pub chats: Mutex<Vec<ChatRequest>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            listing: Listing::Models(Vec::new()),
            chunks: Mutex::new(Vec::new()),
            hang_after_body: false,
            list_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            chats: Mutex::new(Vec::new()),
        }
    }

    pub fn with_models(names: &[&str]) -> Self {
        Self::new().listing(Listing::Models(
            names.iter().map(|n| InstalledModel::named(*n)).collect(),
        ))
    }

    pub fn listing(mut self, listing: Listing) -> Self {
        self.listing = listing;
        self
    }

    /// Body lines, each sent as its own chunk with a trailing newline.
    pub fn lines(self, lines: &[&str]) -> Self {
        let chunks = lines.iter().map(|l| format!("{l}\n").into_bytes()).collect();
        self.chunks(chunks)
    }

    /// Raw body chunks, sent as-is.
    pub fn chunks(self, chunks: Vec<Vec<u8>>) -> Self {
        *self.chunks.lock().unwrap() = chunks;
        self
    }

    /// Keep the body open after the scripted chunks instead of closing it.
    pub fn hang_after_body(mut self) -> Self {
        self.hang_after_body = true;
        self
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn last_chat(&self) -> Option<ChatRequest> {
        self.chats.lock().unwrap().last().cloned()
    }

    pub fn list_call_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn replay(&self) -> FragmentStream {
        let chunks: Vec<Result<Vec<u8>, reqwest::Error>> = self
            .chunks
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(Ok)
            .collect();
        let body = futures::stream::iter(chunks);
        if self.hang_after_body {
            ndjson_fragments("http://mock".into(), body.chain(futures::stream::pending()))
        } else {
            ndjson_fragments("http://mock".into(), body)
        }
    }
}

#[async_trait]
impl ModelService for MockService {
    fn endpoint(&self) -> &str {
        "http://mock"
    }

    async fn list_models(&self) -> Result<Vec<InstalledModel>, LocalGenError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match &self.listing {
            Listing::Models(models) => Ok(models.clone()),
            Listing::Unavailable => Err(LocalGenError::status(
                "http://mock/api/tags",
                503,
                "service down",
            )),
            Listing::TimedOut => Err(LocalGenError::Timeout(3000)),
            Listing::Misconfigured => Err(LocalGenError::Configuration(
                "mock misconfigured".to_string(),
            )),
        }
    }

    async fn generate_stream(
        &self,
        request: &GenerationRequest,
    ) -> Result<FragmentStream, LocalGenError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.replay())
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<FragmentStream, LocalGenError> {
        self.chats.lock().unwrap().push(request.clone());
        Ok(self.replay())
    }

    async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse, LocalGenError> {
        Ok(EmbeddingResponse {
            embedding: vec![request.prompt.len() as f32],
        })
    }

    async fn show_model(&self, name: &str) -> Result<ModelInfo, LocalGenError> {
        Err(LocalGenError::status(
            "http://mock/api/show",
            404,
            &format!("model '{name}' not found"),
        ))
    }
}
