//! Streaming generation against the local model service.

pub mod stream;

pub use stream::{fold_fragments, StreamingGenerator};
