//! Model capability classification and selection.

pub mod capabilities;
pub mod classifier;

pub use capabilities::{classify, CapabilitySet, CapabilityTag};
pub use classifier::{CapabilityCatalog, CatalogSummary, ModelCapabilityClassifier};
