//! Core types for image generation.

use crate::error::{CaptureError, GenerationError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Maps a MIME type to a format.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.to_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Image media types whose data-URI prefix is removed before upload.
const STRIPPED_SUBTYPES: [&str; 4] = ["png", "jpeg", "jpg", "webp"];

/// Removes a leading `data:image/<png|jpeg|jpg|webp>;base64,` prefix.
///
/// Anything else, including data URIs of other media types, is returned
/// unchanged.
pub fn strip_data_uri_prefix(data: &str) -> &str {
    let Some(rest) = data.strip_prefix("data:image/") else {
        return data;
    };
    STRIPPED_SUBTYPES
        .iter()
        .find_map(|subtype| rest.strip_prefix(subtype)?.strip_prefix(";base64,"))
        .unwrap_or(data)
}

/// Splits a `data:<mime>;base64,<payload>` URL into mime type and payload.
fn split_data_url(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    if mime.is_empty() {
        return None;
    }
    Some((mime, payload))
}

/// The photo a figure is generated from.
///
/// Holds base64 text, which may still carry a data-URI prefix when it came
/// straight from a browser-style reader, plus the declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    data: String,
    mime_type: String,
}

impl SourceImage {
    /// Wraps already-encoded base64 (with or without data-URI prefix).
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Encodes raw image bytes.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self::new(
            base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type,
        )
    }

    /// Parses a full `data:<mime>;base64,...` URL, keeping it intact. The
    /// payload must be valid base64.
    pub fn from_data_url(url: &str) -> std::result::Result<Self, CaptureError> {
        let (mime, payload) =
            split_data_url(url).ok_or_else(|| CaptureError::InvalidDataUrl(preview(url)))?;
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| CaptureError::Decode(e.to_string()))?;
        Ok(Self::new(url, mime))
    }

    /// Reads an image file, taking the media type from the extension or,
    /// failing that, from the file's magic bytes.
    pub fn from_path(path: impl AsRef<Path>) -> std::result::Result<Self, CaptureError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
            .or_else(|| ImageFormat::from_magic_bytes(&bytes))
            .ok_or_else(|| CaptureError::UnsupportedMediaType(path.display().to_string()))?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), mime = format.mime_type(), "loaded source image");
        Ok(Self::from_bytes(&bytes, format.mime_type()))
    }

    /// Returns the declared media type.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Returns the stored text exactly as supplied.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Returns the base64 content to transmit, data-URI prefix removed.
    pub fn payload(&self) -> &str {
        strip_data_uri_prefix(&self.data)
    }

    /// Returns the image as an embeddable data URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.payload())
    }
}

fn preview(s: &str) -> String {
    s.chars().take(40).collect()
}

/// Metadata about the generation process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Generation duration in milliseconds.
    pub duration_ms: Option<u64>,
}

/// Normalized output of one generation request.
///
/// `image_url` is `None` when the service returned no image part; callers
/// treat that as a failed request even though the call itself succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Generated image as a `data:<mime>;base64,...` URL.
    pub image_url: Option<String>,
    /// Text the model returned alongside the image.
    pub text: Option<String>,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl GenerationResult {
    /// Returns true if the result carries an image.
    pub fn has_image(&self) -> bool {
        self.image_url.is_some()
    }

    /// Decodes the image into raw bytes, failing with
    /// [`GenerationError::NoImage`] when there is none.
    pub fn to_image(&self) -> Result<GeneratedImage> {
        let url = self.image_url.as_deref().ok_or(GenerationError::NoImage)?;
        GeneratedImage::from_data_url(url)
    }
}

/// A decoded generated image.
#[derive(Debug, Clone)]
#[must_use = "generated image should be saved or processed"]
pub struct GeneratedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Image format.
    pub format: ImageFormat,
}

impl GeneratedImage {
    /// Decodes a `data:<mime>;base64,...` URL. Unknown media types are
    /// sniffed from the bytes and default to PNG.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let (mime, payload) = split_data_url(url)
            .ok_or_else(|| GenerationError::Decode(format!("not a data URL: {}", preview(url))))?;

        let data = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| GenerationError::Decode(e.to_string()))?;

        let format = ImageFormat::from_mime_type(mime)
            .or_else(|| ImageFormat::from_magic_bytes(&data))
            .unwrap_or_default();

        Ok(Self { data, format })
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
    const WEBP_MAGIC: [u8; 12] = *b"RIFF\x00\x00\x00\x00WEBP";

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(ImageFormat::from_magic_bytes(&PNG_MAGIC), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_magic_bytes(&JPEG_MAGIC), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic_bytes(&WEBP_MAGIC), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), None);
    }

    #[test]
    fn test_format_from_mime_type() {
        assert_eq!(ImageFormat::from_mime_type("image/jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_mime_type("IMAGE/PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_mime_type("image/gif"), None);
    }

    #[test]
    fn test_strip_data_uri_prefix() {
        for subtype in ["png", "jpeg", "jpg", "webp"] {
            let url = format!("data:image/{subtype};base64,QUJD");
            assert_eq!(strip_data_uri_prefix(&url), "QUJD");
        }
        assert_eq!(strip_data_uri_prefix("QUJD"), "QUJD");
        assert_eq!(
            strip_data_uri_prefix("data:image/gif;base64,QUJD"),
            "data:image/gif;base64,QUJD"
        );
        assert_eq!(
            strip_data_uri_prefix("data:image/png,QUJD"),
            "data:image/png,QUJD"
        );
        // Only a leading prefix counts.
        assert_eq!(
            strip_data_uri_prefix("xdata:image/png;base64,QUJD"),
            "xdata:image/png;base64,QUJD"
        );
    }

    #[test]
    fn test_source_image_payload() {
        let image = SourceImage::from_data_url("data:image/jpeg;base64,/9j/4AAQ").unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.payload(), "/9j/4AAQ");
        assert_eq!(image.to_data_url(), "data:image/jpeg;base64,/9j/4AAQ");

        let raw = SourceImage::new("/9j/4AAQ", "image/jpeg");
        assert_eq!(raw.payload(), "/9j/4AAQ");
    }

    #[test]
    fn test_source_image_rejects_bad_data_url() {
        assert!(matches!(
            SourceImage::from_data_url("not a url"),
            Err(CaptureError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            SourceImage::from_data_url("data:;base64,AAAA"),
            Err(CaptureError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            SourceImage::from_data_url("data:image/png;base64,not base64!"),
            Err(CaptureError::Decode(_))
        ));
    }

    #[test]
    fn test_source_image_from_path() {
        let dir = tempfile::tempdir().unwrap();

        let named = dir.path().join("photo.JPG");
        std::fs::write(&named, JPEG_MAGIC).unwrap();
        let image = SourceImage::from_path(&named).unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(
            image.payload(),
            base64::engine::general_purpose::STANDARD.encode(JPEG_MAGIC)
        );

        let sniffed = dir.path().join("capture");
        std::fs::write(&sniffed, PNG_MAGIC).unwrap();
        assert_eq!(SourceImage::from_path(&sniffed).unwrap().mime_type(), "image/png");

        let unknown = dir.path().join("notes.txt");
        std::fs::write(&unknown, b"hello, not an image").unwrap();
        assert!(matches!(
            SourceImage::from_path(&unknown),
            Err(CaptureError::UnsupportedMediaType(_))
        ));

        assert!(matches!(
            SourceImage::from_path(dir.path().join("missing.png")),
            Err(CaptureError::Io(_))
        ));
    }

    #[test]
    fn test_result_to_image() {
        let payload = base64::engine::general_purpose::STANDARD.encode(PNG_MAGIC);
        let result = GenerationResult {
            image_url: Some(format!("data:image/png;base64,{payload}")),
            ..Default::default()
        };
        let image = result.to_image().unwrap();
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!(image.size(), PNG_MAGIC.len());

        let empty = GenerationResult::default();
        assert!(!empty.has_image());
        assert!(matches!(empty.to_image(), Err(GenerationError::NoImage)));
    }

    #[test]
    fn test_generated_image_sniffs_unknown_mime() {
        let payload = base64::engine::general_purpose::STANDARD.encode(JPEG_MAGIC);
        let image =
            GeneratedImage::from_data_url(&format!("data:application/octet-stream;base64,{payload}"))
                .unwrap();
        assert_eq!(image.format, ImageFormat::Jpeg);

        assert!(matches!(
            GeneratedImage::from_data_url("data:image/png;base64,!!!"),
            Err(GenerationError::Decode(_))
        ));
    }

    #[test]
    fn test_generated_image_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let image = GeneratedImage {
            data: PNG_MAGIC.to_vec(),
            format: ImageFormat::Png,
        };
        image.save(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), PNG_MAGIC);
    }
}
