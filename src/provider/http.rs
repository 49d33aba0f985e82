//! Shared HTTP client construction, status handling and NDJSON decoding.

use futures::{Stream, StreamExt};
use tracing::trace;

use crate::config::LocalGenConfig;
use crate::error::{LocalGenError, Result};
use crate::types::{FragmentStream, GenerationFragment};

/// Build a reqwest client honoring the configured timeouts.
pub fn build_client(config: &LocalGenConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().pool_max_idle_per_host(10);
    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }
    if let Some(timeout) = config.connect_timeout() {
        builder = builder.connect_timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| LocalGenError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Pass a successful response through; turn anything else into
/// [`LocalGenError::ServiceUnavailable`] carrying status and body.
pub async fn check_status(endpoint: &str, resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(LocalGenError::status(endpoint, status.as_u16(), &body))
}

/// Splits a byte stream into newline-delimited lines.
///
/// Bytes are buffered until a `\n` arrives, so multi-byte characters split
/// across chunks survive. A trailing `\r` is stripped and whitespace-only
/// lines are dropped.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(line) = decode_line(&raw[..raw.len() - 1]) {
                lines.push(line);
            }
        }
        lines
    }

    /// The unterminated last line, if any.
    pub fn finish(self) -> Option<String> {
        decode_line(&self.buffer)
    }
}

fn decode_line(raw: &[u8]) -> Option<String> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line = String::from_utf8_lossy(raw);
    if line.trim().is_empty() {
        None
    } else {
        Some(line.into_owned())
    }
}

/// Decode a response body of newline-delimited JSON objects into fragments.
///
/// The stream stops after the first error.
pub fn ndjson_fragments<S, B>(endpoint: String, body: S) -> FragmentStream
where
    S: Stream<Item = std::result::Result<B, reqwest::Error>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut decoder = LineDecoder::new();
        let mut failed = false;
        futures::pin_mut!(body);

        'read: while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    yield Err(LocalGenError::unreachable(endpoint.clone(), e));
                    failed = true;
                    break 'read;
                }
            };
            for line in decoder.push(chunk.as_ref()) {
                trace!(%line, "stream line");
                match GenerationFragment::parse_line(&line) {
                    Ok(fragment) => yield Ok(fragment),
                    Err(e) => {
                        yield Err(e);
                        failed = true;
                        break 'read;
                    }
                }
            }
        }

        if !failed {
            if let Some(line) = decoder.finish() {
                trace!(%line, "trailing stream line");
                yield GenerationFragment::parse_line(&line);
            }
        }
    };
    Box::pin(stream)
}
