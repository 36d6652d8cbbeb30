//! Image provider trait and the figure generation client.

use crate::error::Result;
use crate::figure::{build_prompt, FigureConfig};
use crate::image::types::{GenerationResult, SourceImage};
use async_trait::async_trait;

/// Trait for services that turn a source image plus prompt into a result.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Submits one request. Implementations must not retry or cache.
    async fn generate(&self, image: &SourceImage, prompt: &str) -> Result<GenerationResult>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;

    /// Checks if the provider is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}

#[async_trait]
impl<P: ImageProvider + ?Sized> ImageProvider for Box<P> {
    async fn generate(&self, image: &SourceImage, prompt: &str) -> Result<GenerationResult> {
        (**self).generate(image, prompt).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn health_check(&self) -> Result<()> {
        (**self).health_check().await
    }
}

/// Generates figure images: renders the prompt for a config and hands it,
/// with the source photo, to a provider.
pub struct FigureClient<P> {
    provider: P,
}

impl<P: ImageProvider> FigureClient<P> {
    /// Wraps a provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Returns the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Generates a figure from `image` styled by `config`.
    ///
    /// Errors from the provider are returned unchanged. Every call goes to
    /// the provider, even for an identical image and config.
    pub async fn generate(
        &self,
        image: &SourceImage,
        config: &FigureConfig,
    ) -> Result<GenerationResult> {
        let prompt = build_prompt(config);
        tracing::debug!(
            provider = self.provider.name(),
            mime = image.mime_type(),
            prompt_len = prompt.len(),
            "submitting figure generation"
        );
        self.provider.generate(image, &prompt).await
    }
}
