//! Error types for figure generation.

use std::time::Duration;

/// Errors that can occur while generating a figure image.
///
/// Every failure of the external call ends up here. The library never
/// retries on its own; callers decide whether to resubmit.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Delay suggested by the `Retry-After` header.
        retry_after: Option<Duration>,
    },

    /// No response within the configured bound.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The service answered without any inline image part.
    #[error("no image returned by the model")]
    NoImage,

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Response body was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenerationError {
    /// Returns true if resubmitting the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Network(_) | Self::NoImage
        )
    }
}

/// Errors raised while acquiring a source image.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Reading the input failed.
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    /// Neither the extension nor the content identify a supported format.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// String looked like a data URL but was malformed.
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// Payload was not valid base64.
    #[error("failed to decode: {0}")]
    Decode(String),
}

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Extracts a `Retry-After` value in seconds from response headers.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Masks anything that looks like a Google API key and caps the length of
/// an upstream error body before it is surfaced.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let masked: String = text
        .split_inclusive(|c: char| c.is_whitespace() || c == '"' || c == '&' || c == '=')
        .map(|token| {
            let word = token.trim_end_matches(|c: char| {
                c.is_whitespace() || c == '"' || c == '&' || c == '='
            });
            if word.starts_with("AIza") && word.len() >= 30 {
                token.replacen(word, "[REDACTED]", 1)
            } else {
                token.to_string()
            }
        })
        .collect();

    let trimmed = masked.trim();
    if trimmed.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let cut: String = trimmed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{cut}...")
    } else {
        trimmed.to_string()
    }
}
