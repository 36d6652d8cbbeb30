//! Generation state for one user session.
//!
//! A [`Session`] keeps the current configuration, the last source photo and
//! the display state. Every submission hands out a [`RequestTicket`]; only
//! the most recent ticket may change the state, so a slow response from a
//! superseded request is dropped instead of overwriting a newer one.

use crate::error::{GenerationError, Result};
use crate::figure::FigureConfig;
use crate::image::{FigureClient, GenerationResult, ImageProvider, SourceImage};
use std::time::Duration;

/// Upper bound on a single generation call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// What the session is currently showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GenerationState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// A request is in flight.
    Processing,
    /// The latest request produced an image.
    Completed(GenerationResult),
    /// The latest request failed.
    Error(String),
}

impl GenerationState {
    /// Short lowercase name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Processing => "processing",
            Self::Completed(_) => "completed",
            Self::Error(_) => "error",
        }
    }

    /// Returns true while a request is outstanding.
    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Processing)
    }
}

/// Handle for one submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

impl RequestTicket {
    /// Sequence number of the request.
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// Configuration, source photo and state of one session.
#[derive(Debug, Default)]
pub struct Session {
    config: FigureConfig,
    source: Option<SourceImage>,
    state: GenerationState,
    latest: u64,
}

impl Session {
    /// Creates an idle session with the given configuration.
    pub fn new(config: FigureConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &FigureConfig {
        &self.config
    }

    /// Mutable access to the configuration for the next (re)generation.
    pub fn config_mut(&mut self) -> &mut FigureConfig {
        &mut self.config
    }

    /// The retained source photo, if any.
    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    /// Current state.
    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    /// Returns true if `ticket` belongs to the most recent submission.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest && self.state.is_processing()
    }

    /// Stores a new source photo and starts processing it.
    pub fn submit(&mut self, image: SourceImage) -> RequestTicket {
        self.source = Some(image);
        self.start()
    }

    /// Starts processing the retained photo again, typically after the
    /// configuration changed or the last attempt failed. Returns `None` if
    /// no photo has been submitted.
    pub fn regenerate(&mut self) -> Option<RequestTicket> {
        self.source.as_ref()?;
        Some(self.start())
    }

    fn start(&mut self) -> RequestTicket {
        self.latest += 1;
        self.state = GenerationState::Processing;
        RequestTicket(self.latest)
    }

    /// Applies the outcome of a request.
    ///
    /// Returns false and leaves the state untouched when the ticket has been
    /// superseded or the session was reset. A result without an image is
    /// recorded as an error.
    pub fn finish(&mut self, ticket: RequestTicket, outcome: Result<GenerationResult>) -> bool {
        if !self.is_current(ticket) {
            tracing::warn!(
                ticket = ticket.0,
                latest = self.latest,
                "discarding response for superseded request"
            );
            return false;
        }

        self.state = match outcome {
            Ok(result) if result.has_image() => GenerationState::Completed(result),
            Ok(_) => GenerationState::Error(GenerationError::NoImage.to_string()),
            Err(e) => GenerationState::Error(e.to_string()),
        };
        true
    }

    /// Drops the photo and any result and returns to idle. Responses to
    /// requests started before the reset are discarded.
    pub fn reset(&mut self) {
        self.latest += 1;
        self.source = None;
        self.state = GenerationState::Idle;
    }

    /// Runs one generation for the retained photo and records the outcome.
    ///
    /// Returns the state reached. Fails with `InvalidRequest` when no photo
    /// has been submitted.
    pub async fn generate<P: ImageProvider>(
        &mut self,
        client: &FigureClient<P>,
        timeout: Duration,
    ) -> Result<&GenerationState> {
        let ticket = self
            .regenerate()
            .ok_or_else(|| GenerationError::InvalidRequest("no source image submitted".into()))?;
        let image = self
            .source
            .clone()
            .ok_or_else(|| GenerationError::InvalidRequest("no source image submitted".into()))?;

        let outcome = run_request(client, &image, &self.config, timeout).await;
        self.finish(ticket, outcome);
        Ok(&self.state)
    }
}

/// Calls `client` with a time bound and rejects results without an image.
pub async fn run_request<P: ImageProvider>(
    client: &FigureClient<P>,
    image: &SourceImage,
    config: &FigureConfig,
    timeout: Duration,
) -> Result<GenerationResult> {
    let result = tokio::time::timeout(timeout, client.generate(image, config))
        .await
        .map_err(|_| GenerationError::Timeout(timeout))??;

    if !result.has_image() {
        return Err(GenerationError::NoImage);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::provider::tests::{image_result, ScriptedProvider};
    use async_trait::async_trait;

    fn photo() -> SourceImage {
        SourceImage::new("data:image/jpeg;base64,/9j/", "image/jpeg")
    }

    #[test]
    fn test_state_transitions() {
        let mut session = Session::default();
        assert_eq!(session.state(), &GenerationState::Idle);
        assert!(session.regenerate().is_none());

        let ticket = session.submit(photo());
        assert!(session.state().is_processing());
        assert!(session.finish(ticket, Ok(image_result("data:image/png;base64,AA=="))));
        assert_eq!(session.state().as_str(), "completed");

        let ticket = session.regenerate().unwrap();
        assert!(session.finish(
            ticket,
            Err(GenerationError::Api {
                status: 500,
                message: "down".into()
            })
        ));
        assert_eq!(session.state().as_str(), "error");
        assert_eq!(session.source(), Some(&photo()));

        let ticket = session.regenerate().unwrap();
        assert!(session.state().is_processing());
        assert!(session.finish(ticket, Ok(image_result("data:image/png;base64,BB=="))));

        session.reset();
        assert_eq!(session.state(), &GenerationState::Idle);
        assert!(session.source().is_none());
    }

    #[test]
    fn test_superseded_response_is_discarded() {
        let mut session = Session::default();
        let first = session.submit(photo());
        let second = session.regenerate().unwrap();
        assert!(second.seq() > first.seq());

        // The newer request resolves first, then the stale one arrives.
        assert!(session.finish(second, Ok(image_result("data:image/png;base64,NEW="))));
        assert!(!session.finish(first, Err(GenerationError::NoImage)));

        match session.state() {
            GenerationState::Completed(result) => {
                assert_eq!(result.image_url.as_deref(), Some("data:image/png;base64,NEW="));
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_stale_response_while_newer_pending() {
        let mut session = Session::default();
        let first = session.submit(photo());
        let _second = session.regenerate().unwrap();

        assert!(!session.finish(first, Ok(image_result("data:image/png;base64,OLD="))));
        assert!(session.state().is_processing());
    }

    #[test]
    fn test_reset_discards_pending_response() {
        let mut session = Session::default();
        let ticket = session.submit(photo());
        session.reset();
        assert!(!session.finish(ticket, Ok(image_result("data:image/png;base64,AA=="))));
        assert_eq!(session.state(), &GenerationState::Idle);
    }

    #[test]
    fn test_result_without_image_is_error() {
        let mut session = Session::default();
        let ticket = session.submit(photo());
        assert!(session.finish(ticket, Ok(GenerationResult::default())));
        assert_eq!(
            session.state(),
            &GenerationState::Error(GenerationError::NoImage.to_string())
        );
    }

    #[tokio::test]
    async fn test_session_generate_uses_current_config() {
        let client = FigureClient::new(ScriptedProvider::new(vec![
            Err(GenerationError::Timeout(Duration::from_secs(1))),
            Ok(image_result("data:image/png;base64,AA==")),
        ]));
        let mut session = Session::new(FigureConfig::default());
        session.submit(photo());

        let state = session.generate(&client, DEFAULT_TIMEOUT).await.unwrap();
        assert_eq!(state.as_str(), "error");

        session.config_mut().box_label = "Second Try".into();
        let state = session.generate(&client, DEFAULT_TIMEOUT).await.unwrap();
        assert_eq!(state.as_str(), "completed");

        let calls = client.provider().calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].1.contains("\"Second Try\" logo"));
    }

    #[tokio::test]
    async fn test_session_generate_without_photo() {
        let client = FigureClient::new(ScriptedProvider::new(vec![]));
        let mut session = Session::default();
        let err = session.generate(&client, DEFAULT_TIMEOUT).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidRequest(_)));
        assert_eq!(session.state(), &GenerationState::Idle);
    }

    #[tokio::test]
    async fn test_run_request_rejects_missing_image() {
        let client = FigureClient::new(ScriptedProvider::new(vec![Ok(GenerationResult {
            text: Some("only words".into()),
            ..Default::default()
        })]));
        let err = run_request(&client, &photo(), &FigureConfig::default(), DEFAULT_TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::NoImage));
    }

    struct StalledProvider;

    #[async_trait]
    impl ImageProvider for StalledProvider {
        async fn generate(&self, _image: &SourceImage, _prompt: &str) -> Result<GenerationResult> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(GenerationResult::default())
        }

        fn name(&self) -> &str {
            "stalled"
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_timeout_moves_to_error() {
        let client = FigureClient::new(StalledProvider);
        let mut session = Session::default();
        session.submit(photo());

        let timeout = Duration::from_millis(20);
        let state = session.generate(&client, timeout).await.unwrap();
        assert_eq!(
            state,
            &GenerationState::Error(GenerationError::Timeout(timeout).to_string())
        );
    }
}
