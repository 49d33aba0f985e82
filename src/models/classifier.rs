//! Capability discovery over the installed models.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::capabilities::{classify, CapabilitySet, CapabilityTag, FALLBACK_ANY_MODELS};
use crate::config::LocalGenConfig;
use crate::error::{LocalGenError, Result};
use crate::provider::{ModelService, OllamaService};
use crate::types::{ModelDescriptor, ModelInfo};

/// Installed models grouped by capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapabilityCatalog {
    /// Every tag is present, possibly with an empty list.
    pub by_capability: BTreeMap<CapabilityTag, Vec<ModelDescriptor>>,
    pub summary: CatalogSummary,
    /// Set when the listing failed and the catalog is empty.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub total_models: usize,
    pub counts: BTreeMap<CapabilityTag, usize>,
}

impl CapabilityCatalog {
    pub fn from_models(models: &[ModelDescriptor]) -> Self {
        let mut by_capability: BTreeMap<CapabilityTag, Vec<ModelDescriptor>> = CapabilityTag::ALL
            .iter()
            .map(|tag| (*tag, Vec::new()))
            .collect();
        for model in models {
            for tag in &model.capabilities {
                if let Some(bucket) = by_capability.get_mut(tag) {
                    bucket.push(model.clone());
                }
            }
        }
        let counts = by_capability
            .iter()
            .map(|(tag, models)| (*tag, models.len()))
            .collect();
        Self {
            by_capability,
            summary: CatalogSummary {
                total_models: models.len(),
                counts,
            },
            error: None,
        }
    }

    fn failed(error: &LocalGenError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::from_models(&[])
        }
    }

    pub fn models(&self, tag: CapabilityTag) -> &[ModelDescriptor] {
        self.by_capability
            .get(&tag)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn count(&self, tag: CapabilityTag) -> usize {
        self.summary.counts.get(&tag).copied().unwrap_or(0)
    }
}

/// Classifies installed models by name and picks models per capability.
#[derive(Clone)]
pub struct ModelCapabilityClassifier {
    service: Arc<dyn ModelService>,
}

impl std::fmt::Debug for ModelCapabilityClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCapabilityClassifier")
            .field("endpoint", &self.service.endpoint())
            .finish()
    }
}

impl ModelCapabilityClassifier {
    /// Classifier backed by an [`OllamaService`] for `config`.
    pub fn new(config: LocalGenConfig) -> Result<Self> {
        Ok(Self::with_service(Arc::new(OllamaService::new(config)?)))
    }

    pub fn with_service(service: Arc<dyn ModelService>) -> Self {
        Self { service }
    }

    /// Capability tags for a model name. Pure; see [`classify`].
    pub fn classify(name: &str) -> CapabilitySet {
        classify(name)
    }

    /// Keep the descriptors carrying `tag`, in input order. `None` keeps all.
    pub fn list_by_capability(
        models: &[ModelDescriptor],
        tag: Option<CapabilityTag>,
    ) -> Vec<ModelDescriptor> {
        match tag {
            None => models.to_vec(),
            Some(tag) => models.iter().filter(|m| m.has(tag)).cloned().collect(),
        }
    }

    /// [`list_by_capability`](Self::list_by_capability) with a tag given by
    /// name. Unknown names fail with [`LocalGenError::InvalidCapability`].
    pub fn list_by_capability_name(
        models: &[ModelDescriptor],
        tag: Option<&str>,
    ) -> Result<Vec<ModelDescriptor>> {
        let tag = tag.map(CapabilityTag::parse).transpose()?;
        Ok(Self::list_by_capability(models, tag))
    }

    /// Index of the first name carrying `tag`, or 0.
    pub fn preferred_index<S: AsRef<str>>(names: &[S], tag: CapabilityTag) -> usize {
        names
            .iter()
            .position(|name| classify(name.as_ref()).contains(&tag))
            .unwrap_or(0)
    }

    /// Every installed model with its capabilities, in service order.
    pub async fn installed(&self) -> Result<Vec<ModelDescriptor>> {
        let models = self.service.list_models().await?;
        debug!(count = models.len(), "Listed installed models");
        Ok(models.into_iter().map(ModelDescriptor::from).collect())
    }

    /// Installed models carrying `tag` (all of them for `None`).
    pub async fn local_models(&self, tag: Option<CapabilityTag>) -> Result<Vec<ModelDescriptor>> {
        let installed = self.installed().await?;
        Ok(Self::list_by_capability(&installed, tag))
    }

    /// Name of the first installed model carrying `tag`, or the tag's
    /// default model. Never fails.
    pub async fn best_model_for(&self, tag: CapabilityTag) -> String {
        match self.local_models(Some(tag)).await {
            Ok(models) => {
                if let Some(first) = models.into_iter().next() {
                    return first.name;
                }
                debug!(%tag, "No installed model matches, using default");
            }
            Err(err) => log_listing_failure(&err, tag.as_str()),
        }
        tag.default_model().to_string()
    }

    /// Names of installed models carrying `tag`.
    ///
    /// When the service cannot be reached the tag's fallback list is
    /// returned instead. A reachable service with no matching model yields
    /// an empty list.
    pub async fn model_names_for(&self, tag: Option<CapabilityTag>) -> Result<Vec<String>> {
        match self.local_models(tag).await {
            Ok(models) => Ok(models.into_iter().map(|m| m.name).collect()),
            Err(err) if err.is_listing_fallback() => {
                log_listing_failure(&err, tag.map_or("any", CapabilityTag::as_str));
                let fallback = tag.map_or(FALLBACK_ANY_MODELS, CapabilityTag::fallback_models);
                Ok(fallback.iter().map(|s| s.to_string()).collect())
            }
            Err(err) => Err(err),
        }
    }

    /// Sorted, de-duplicated names of all installed models, falling back to
    /// the generic defaults when the listing fails or is empty.
    pub async fn available_model_names(&self) -> Result<Vec<String>> {
        let names = match self.service.list_models().await {
            Ok(models) => {
                let mut names: Vec<String> = models
                    .iter()
                    .map(|m| m.identifier().trim().to_string())
                    .filter(|name| !name.is_empty())
                    .collect();
                names.sort();
                names.dedup();
                names
            }
            Err(err) if err.is_listing_fallback() => {
                log_listing_failure(&err, "any");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        if names.is_empty() {
            return Ok(FALLBACK_ANY_MODELS.iter().map(|s| s.to_string()).collect());
        }
        Ok(names)
    }

    /// Capabilities of the installed model called exactly `name`; empty when
    /// it is not installed or the listing fails.
    pub async fn capabilities_of(&self, name: &str) -> CapabilitySet {
        match self.installed().await {
            Ok(models) => models
                .into_iter()
                .find(|m| m.name == name)
                .map(|m| m.capabilities)
                .unwrap_or_default(),
            Err(err) => {
                log_listing_failure(&err, name);
                CapabilitySet::new()
            }
        }
    }

    /// Installed models grouped by capability, with counts.
    pub async fn catalog(&self) -> CapabilityCatalog {
        match self.installed().await {
            Ok(models) => CapabilityCatalog::from_models(&models),
            Err(err) => {
                log_listing_failure(&err, "catalog");
                CapabilityCatalog::failed(&err)
            }
        }
    }

    /// Detailed model information, with name-derived capabilities.
    pub async fn model_info(&self, name: &str) -> Result<ModelInfo> {
        self.service.show_model(name).await
    }
}

fn log_listing_failure(err: &LocalGenError, wanted: &str) {
    if err.is_listing_fallback() {
        warn!(error = %err, wanted, "Model listing unavailable, using defaults");
    } else {
        warn!(error = %err, category = ?err.category(), wanted, "Model listing failed unexpectedly, using defaults");
    }
}
