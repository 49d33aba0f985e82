//! Error types for localgen.

use thiserror::Error;

/// Primary error type for all localgen operations.
#[derive(Error, Debug)]
pub enum LocalGenError {
    #[error("Model service unavailable at {endpoint}: {message}")]
    ServiceUnavailable {
        endpoint: String,
        status: Option<u16>,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Malformed stream line {line:?}: {source}")]
    MalformedStream {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid capability: {0} (expected one of embedding, vision, tools, thinking, chat)")]
    InvalidCapability(String),

    #[error("Generation cancelled")]
    Cancelled,

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Stream,
    Cancelled,
    Timeout,
    Usage,
    Configuration,
    Serialization,
}

impl LocalGenError {
    /// The service could not be reached at all.
    pub fn unreachable(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        Self::ServiceUnavailable {
            endpoint: endpoint.into(),
            status: None,
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// The service answered with a failing HTTP status.
    pub fn status(endpoint: impl Into<String>, status: u16, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {body}")
        };
        Self::ServiceUnavailable {
            endpoint: endpoint.into(),
            status: Some(status),
            message,
            source: None,
        }
    }

    /// A stream line that did not decode as a JSON fragment.
    pub fn malformed(line: impl Into<String>, source: serde_json::Error) -> Self {
        Self::MalformedStream {
            line: line.into(),
            source,
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ServiceUnavailable { .. } => ErrorCategory::Network,
            Self::MalformedStream { .. } => ErrorCategory::Stream,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::InvalidCapability(_) | Self::InvalidArgument(_) => ErrorCategory::Usage,
            Self::Configuration(_) | Self::Io(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
        }
    }

    /// Whether a model listing that failed this way may be replaced by the
    /// fixed default model names.
    pub fn is_listing_fallback(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Timeout | ErrorCategory::Serialization
        )
    }

    /// HTTP status reported by the service, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::ServiceUnavailable { status, .. } => *status,
            _ => None,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, LocalGenError>;
