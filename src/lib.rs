#![warn(missing_docs)]
//! Figurize - turn a photo into a boxed collectible figure.
//!
//! A [`FigureConfig`] describes the figure (style, pose, material, held
//! item, environment, lighting, box label). [`build_prompt`] renders it into
//! an instruction for an image model, and [`FigureClient`] sends that
//! instruction together with the source photo to an [`ImageProvider`].
//!
//! # Quick Start
//!
//! ```no_run
//! use figurize::{FigureClient, FigureConfig, GeminiProvider, SourceImage, Style};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FigureClient::new(GeminiProvider::builder().build()?);
//!     let photo = SourceImage::from_path("me.jpg")?;
//!     let config = FigureConfig::default().with_style(Style::Chibi);
//!
//!     let result = client.generate(&photo, &config).await?;
//!     result.to_image()?.save("figure.png")?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `gemini-image`: Gemini (Google) provider
//! - `cli`: Command-line interface

mod error;
pub mod figure;
pub mod image;
pub mod session;

pub use error::{CaptureError, GenerationError, Result};
pub use figure::{
    build_prompt, Background, Environment, FigureConfig, Lighting, Material, Pose, Style,
    UnknownOption,
};
pub use image::{
    FigureClient, GeneratedImage, GenerationMetadata, GenerationResult, ImageFormat,
    ImageProvider, SourceImage,
};
pub use session::{GenerationState, RequestTicket, Session};

#[cfg(feature = "gemini-image")]
pub use image::providers::{GeminiModel, GeminiProvider, GeminiProviderBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{GenerationError, Result};
    pub use crate::figure::{build_prompt, FigureConfig};
    pub use crate::image::{FigureClient, GenerationResult, ImageProvider, SourceImage};
    pub use crate::session::{GenerationState, Session};

    #[cfg(feature = "gemini-image")]
    pub use crate::image::providers::GeminiProvider;
}
