//! Streaming text generation with incremental progress.

use std::sync::Arc;

use std::future::Future;

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::config::LocalGenConfig;
use crate::error::{LocalGenError, Result};
use crate::provider::{ModelService, OllamaService};
use crate::types::{ChatRequest, FragmentStream, GenerationFragment, GenerationRequest};

/// Runs one generation call and assembles the streamed text.
///
/// Holds no state between calls; concurrent `run`s each own their
/// accumulator and connection.
#[derive(Clone)]
pub struct StreamingGenerator {
    service: Arc<dyn ModelService>,
}

impl std::fmt::Debug for StreamingGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingGenerator")
            .field("endpoint", &self.service.endpoint())
            .finish()
    }
}

impl StreamingGenerator {
    /// Generator backed by an [`OllamaService`] for `config`.
    pub fn new(config: LocalGenConfig) -> Result<Self> {
        Ok(Self::with_service(Arc::new(OllamaService::new(config)?)))
    }

    pub fn with_service(service: Arc<dyn ModelService>) -> Self {
        Self { service }
    }

    /// Stream a generation, calling `on_progress` with the full text so far
    /// after every fragment. Returns the final text.
    pub async fn run<F>(&self, request: &GenerationRequest, on_progress: F) -> Result<String>
    where
        F: FnMut(&str),
    {
        self.run_cancellable(request, &CancellationToken::new(), on_progress)
            .await
    }

    /// Like [`run`](Self::run), aborting with [`LocalGenError::Cancelled`]
    /// once `cancel` fires. Text already passed to `on_progress` stays
    /// delivered.
    pub async fn run_cancellable<F>(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<String>
    where
        F: FnMut(&str),
    {
        self.stream_text(
            request.model(),
            cancel,
            self.service.generate_stream(request),
            on_progress,
        )
        .await
    }

    /// Stream a chat reply the same way [`run`](Self::run) streams a
    /// generation. Progress carries the assistant text so far.
    pub async fn chat<F>(&self, request: &ChatRequest, on_progress: F) -> Result<String>
    where
        F: FnMut(&str),
    {
        self.chat_cancellable(request, &CancellationToken::new(), on_progress)
            .await
    }

    pub async fn chat_cancellable<F>(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<String>
    where
        F: FnMut(&str),
    {
        self.stream_text(
            request.model(),
            cancel,
            self.service.chat_stream(request),
            on_progress,
        )
        .await
    }

    async fn stream_text<O, F>(
        &self,
        model: &str,
        cancel: &CancellationToken,
        open: O,
        on_progress: F,
    ) -> Result<String>
    where
        O: Future<Output = Result<FragmentStream>>,
        F: FnMut(&str),
    {
        if model.trim().is_empty() {
            return Err(LocalGenError::InvalidArgument(
                "request needs a model name".to_string(),
            ));
        }
        if cancel.is_cancelled() {
            return Err(LocalGenError::Cancelled);
        }

        let fragments = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LocalGenError::Cancelled),
            opened = open => opened?,
        };
        fold_fragments(fragments, cancel, on_progress).await
    }

    /// Wait for the complete text without observing progress.
    pub async fn collect(&self, request: &GenerationRequest) -> Result<String> {
        self.run(request, |_| {}).await
    }
}

/// Fold a fragment stream into one string.
///
/// `on_progress` gets the cumulative text once per fragment. The first error
/// aborts the fold; dropping the stream closes the underlying connection.
/// `done` markers are observed but never end the fold early.
pub async fn fold_fragments<S, F>(
    fragments: S,
    cancel: &CancellationToken,
    mut on_progress: F,
) -> Result<String>
where
    S: Stream<Item = Result<GenerationFragment>>,
    F: FnMut(&str),
{
    futures::pin_mut!(fragments);
    let mut text = String::new();
    let mut count = 0usize;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(fragments = count, chars = text.len(), "Generation cancelled");
                return Err(LocalGenError::Cancelled);
            }
            next = fragments.next() => next,
        };
        let Some(fragment) = next else { break };
        let fragment = fragment?;
        count += 1;

        if let Some(error) = &fragment.error {
            warn!(%error, "Model service reported an error in-stream");
        }
        if fragment.is_done() {
            debug!(
                done_reason = fragment.done_reason.as_deref().unwrap_or(""),
                eval_count = ?fragment.eval_count,
                "Generation reported done"
            );
        }

        trace!(delta = fragment.text(), "fragment");
        text.push_str(fragment.text());
        on_progress(&text);
    }

    debug!(fragments = count, chars = text.len(), "Generation stream closed");
    Ok(text)
}
