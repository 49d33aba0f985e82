//! Image input types.

use std::path::Path;

use base64::Engine;

use crate::error::Result;

/// An image that can be sent along with a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// Already base64-encoded data.
    Base64(String),
    /// Raw bytes, encoded on demand.
    Bytes(Vec<u8>),
}

impl ImageInput {
    /// Create from a base64 string. A `data:<mime>;base64,` prefix is dropped.
    pub fn from_base64(data: impl Into<String>) -> Self {
        let data = data.into();
        match data.split_once(";base64,") {
            Some((prefix, payload)) if prefix.starts_with("data:") => {
                Self::Base64(payload.to_string())
            }
            _ => Self::Base64(data),
        }
    }

    /// Create from raw bytes.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self::Bytes(data)
    }

    /// Read an image file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::Bytes(std::fs::read(path)?))
    }

    /// Convert to base64 data string regardless of variant.
    pub fn to_base64(&self) -> String {
        match self {
            Self::Base64(data) => data.clone(),
            Self::Bytes(data) => base64::engine::general_purpose::STANDARD.encode(data),
        }
    }
}
