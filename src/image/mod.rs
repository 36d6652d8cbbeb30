//! Source images, generation results and the providers that produce them.

pub(crate) mod provider;
pub mod providers;
mod types;

pub use provider::{FigureClient, ImageProvider};
pub use types::{
    strip_data_uri_prefix, GeneratedImage, GenerationMetadata, GenerationResult, ImageFormat,
    SourceImage,
};
