//! Installed-model descriptors.

use serde::{Deserialize, Serialize};

use crate::models::capabilities::{classify, CapabilitySet, CapabilityTag};

/// Model metadata as reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub families: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantization_level: Option<String>,
}

/// One entry of the `/api/tags` listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledModel {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub digest: String,
    #[serde(default)]
    pub modified_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ModelDetails>,
}

impl InstalledModel {
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            model: name.clone(),
            name,
            ..Default::default()
        }
    }

    /// The identifier to pass back to the service: `model`, else `name`.
    pub fn identifier(&self) -> &str {
        if self.model.is_empty() {
            &self.name
        } else {
            &self.model
        }
    }
}

/// Body of `GET /api/tags`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<InstalledModel>,
}

/// An installed model together with its name-derived capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    pub name: String,
    pub capabilities: CapabilitySet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ModelDetails>,
}

impl ModelDescriptor {
    /// Descriptor with no service metadata.
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            capabilities: classify(&name),
            name,
            size: None,
            digest: None,
            modified_at: None,
            details: None,
        }
    }

    pub fn has(&self, tag: CapabilityTag) -> bool {
        self.capabilities.contains(&tag)
    }
}

impl From<InstalledModel> for ModelDescriptor {
    fn from(model: InstalledModel) -> Self {
        let name = model.identifier().to_string();
        Self {
            capabilities: classify(&name),
            name,
            size: Some(model.size),
            digest: Some(model.digest).filter(|d| !d.is_empty()),
            modified_at: Some(model.modified_at).filter(|m| !m.is_empty()),
            details: model.details,
        }
    }
}

/// Detailed information about one model (`POST /api/show`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub capabilities: CapabilitySet,
    pub details: Option<ModelDetails>,
    pub modelfile: String,
    pub parameters: String,
    pub template: String,
    pub system: String,
}

/// Body of `POST /api/show`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ShowResponse {
    #[serde(default)]
    pub details: Option<ModelDetails>,
    #[serde(default)]
    pub modelfile: String,
    #[serde(default)]
    pub parameters: String,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub system: String,
}

impl ShowResponse {
    pub(crate) fn into_info(self, name: &str) -> ModelInfo {
        ModelInfo {
            name: name.to_string(),
            capabilities: classify(name),
            details: self.details,
            modelfile: self.modelfile,
            parameters: self.parameters,
            template: self.template,
            system: self.system,
        }
    }
}
