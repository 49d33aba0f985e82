//! Core types for localgen.

pub mod chat;
pub mod embedding;
pub mod generation;
pub mod image;
pub mod model;
pub mod stream;

pub use chat::*;
pub use embedding::*;
pub use generation::*;
pub use image::*;
pub use model::*;
pub use stream::*;
