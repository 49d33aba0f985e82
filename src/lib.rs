//! localgen: streaming generation and model discovery for a local Ollama server.
//!
//! Two components sit on top of a [`provider::ModelService`]:
//!
//! - [`generation::StreamingGenerator`] streams `/api/generate` and hands the
//!   growing text to a progress callback.
//! - [`models::ModelCapabilityClassifier`] tags installed models by name and
//!   picks a model per capability, falling back to defaults when the server
//!   is down.
//!
//! # Quick Start
//!
//! ```no_run
//! use localgen::prelude::*;
//!
//! # async fn example() -> localgen::error::Result<()> {
//! let config = LocalGenConfig::from_env();
//! let classifier = ModelCapabilityClassifier::new(config.clone())?;
//! let model = classifier.best_model_for(CapabilityTag::Chat).await;
//!
//! let generator = StreamingGenerator::new(config)?;
//! let request = GenerationRequest::new(model, "Why is the sky blue?");
//! let text = generator.run(&request, |partial| println!("{partial}")).await?;
//! # let _ = text;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod generation;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
