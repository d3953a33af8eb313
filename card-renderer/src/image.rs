//! Image decoding and data URI utilities.
//!
//! Every loaded image ends up as a [`Bitmap`] of RGBA8 pixels tagged with
//! the locator it came from.

use base64::Engine;
use card_core::Bitmap;
use image::ImageEncoder;

use crate::error::{LoadResult, RenderError, RenderResult, ResourceLoadError};

/// Image formats recognised by their leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// GIF (first frame only).
    Gif,
    /// WebP (alpha support).
    WebP,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/gif" => Self::Gif,
            "image/webp" => Self::WebP,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }

        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }

    /// MIME type used when embedding bytes of this format in a data URI.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// Decode encoded image bytes into a bitmap remembered under `locator`.
///
/// # Errors
///
/// Returns [`ResourceLoadError::Decode`] if the bytes are not an image.
pub fn decode_bitmap(locator: impl Into<String>, data: &[u8]) -> LoadResult<Bitmap> {
    let img = image::load_from_memory(data)
        .map_err(|e| ResourceLoadError::Decode(e.to_string()))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Bitmap::new(locator, width, height, rgba.into_raw()))
}

/// Whether `locator` is a data URI.
#[must_use]
pub fn is_data_uri(locator: &str) -> bool {
    locator
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Extract the payload bytes of a data URI.
///
/// Supports both `;base64` and percent-encoded payloads. A `%` that does
/// not start a valid escape is kept as a literal byte.
///
/// # Errors
///
/// Returns [`ResourceLoadError::InvalidLocator`] if the URI is malformed and
/// [`ResourceLoadError::Decode`] if the base64 payload is invalid.
pub fn parse_data_uri(uri: &str) -> LoadResult<Vec<u8>> {
    if !is_data_uri(uri) {
        return Err(ResourceLoadError::InvalidLocator(
            "Not a data URI".to_string(),
        ));
    }

    let (metadata, payload) = uri[5..].split_once(',').ok_or_else(|| {
        ResourceLoadError::InvalidLocator("Invalid data URI: missing comma".to_string())
    })?;

    if metadata.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ResourceLoadError::Decode(format!("Invalid base64 payload: {e}")))
    } else {
        Ok(percent_encoding::percent_decode_str(payload).collect())
    }
}

/// Build a base64 data URI for encoded image bytes.
#[must_use]
pub fn to_data_uri(data: &[u8]) -> String {
    let mime = ImageFormat::from_magic_bytes(data).mime();
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{mime};base64,{encoded}")
}

/// Encode a bitmap's pixels as PNG.
///
/// # Errors
///
/// Returns an error if the pixel buffer does not match the dimensions.
pub fn encode_png(bitmap: &Bitmap) -> RenderResult<Vec<u8>> {
    let expected = u64::from(bitmap.width()) * u64::from(bitmap.height()) * 4;
    if bitmap.pixels().len() as u64 != expected {
        return Err(RenderError::Resource(format!(
            "Pixel buffer holds {} bytes, expected {expected}",
            bitmap.pixels().len()
        )));
    }

    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(
            bitmap.pixels(),
            bitmap.width(),
            bitmap.height(),
            image::ColorType::Rgba8.into(),
        )
        .map_err(|e| RenderError::Resource(format!("PNG encoding failed: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// 1x1 red PNG.
    pub const RED_PIXEL_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    pub fn red_pixel_png() -> Vec<u8> {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(RED_PIXEL_PNG_BASE64)
            .expect("fixture decodes")
    }
}
