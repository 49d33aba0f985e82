//! Streaming types.

use futures::stream::BoxStream;
use serde::de::Error as _;
use serde::{Deserialize, Serialize};

use super::chat::ChatMessage;
use crate::error::{LocalGenError, Result};

/// One decoded JSON object from a single line of a generation or chat stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationFragment {
    /// Text delta to append. Absent or `null` counts as empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Chat streams carry their delta here instead of in `response`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ChatMessage>,
    /// Logical completion marker. Observed only; the stream ends when the
    /// connection does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    /// Server-side error reported in-band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl GenerationFragment {
    /// Fragment carrying only a text delta.
    pub fn text_delta(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
            ..Default::default()
        }
    }

    /// Decode one non-blank stream line. Anything but a JSON object is
    /// [`LocalGenError::MalformedStream`].
    pub fn parse_line(line: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(line).map_err(|e| LocalGenError::malformed(line, e))?;
        if !value.is_object() {
            return Err(LocalGenError::malformed(
                line,
                serde_json::Error::custom("fragment is not a JSON object"),
            ));
        }
        serde_json::from_value(value).map_err(|e| LocalGenError::malformed(line, e))
    }

    /// The text delta, empty when absent.
    pub fn text(&self) -> &str {
        self.response
            .as_deref()
            .or_else(|| self.message.as_ref().map(|m| m.content.as_str()))
            .unwrap_or_default()
    }

    pub fn is_done(&self) -> bool {
        self.done.unwrap_or(false)
    }
}

/// Lazily decoded fragments of one generation call.
pub type FragmentStream = BoxStream<'static, Result<GenerationFragment>>;
