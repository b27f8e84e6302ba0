//! Image sources: embedded data URIs and the symbolic source names.
//!
//! Uploaded images are embedded straight into the layout as base64 data URIs;
//! no size limit is applied, so large uploads grow the saved document.

#[cfg(test)]
#[path = "media_test.rs"]
mod media_test;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Errors produced while encoding or decoding embedded images.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("not a data URI")]
    NotDataUri,
    #[error("data URI is not base64-encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unrecognized image format: {0}")]
    Format(#[from] image::ImageError),
}

/// Symbolic image sources the editor draws a labelled placeholder for.
pub const KNOWN_SOURCES: [(&str, &str); 4] = [
    ("COMPANY_LOGO", "LOGO"),
    ("INSURER_LOGO", "INSURER"),
    ("MEMBER_PHOTO", "PHOTO"),
    ("NETWORK_BADGE", "NETWORK"),
];

/// A decoded data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Whether an image source is an embedded data URI.
#[must_use]
pub fn is_data_uri(source: &str) -> bool {
    source.starts_with("data:")
}

/// Placeholder label for a known symbolic source.
#[must_use]
pub fn source_label(source: &str) -> Option<&'static str> {
    KNOWN_SOURCES.iter().find(|(name, _)| *name == source).map(|(_, label)| *label)
}

/// Encode bytes as a base64 data URI.
#[must_use]
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Encode an uploaded image, sniffing its MIME type from the content.
///
/// # Errors
///
/// Returns [`MediaError::Format`] if the bytes are not a recognizable image.
pub fn image_data_uri(bytes: &[u8]) -> Result<String, MediaError> {
    let format = image::guess_format(bytes)?;
    Ok(data_uri(format.to_mime_type(), bytes))
}

/// Split and decode a `data:<mime>;base64,<payload>` URI.
///
/// # Errors
///
/// Fails when the text is not a base64 data URI or the payload is malformed.
pub fn decode_data_uri(source: &str) -> Result<DataUri, MediaError> {
    let rest = source.strip_prefix("data:").ok_or(MediaError::NotDataUri)?;
    let (meta, payload) = rest.split_once(',').ok_or(MediaError::NotDataUri)?;
    let mime = meta.strip_suffix(";base64").ok_or(MediaError::NotBase64)?;
    let bytes = STANDARD.decode(payload.trim())?;
    Ok(DataUri { mime: mime.to_owned(), bytes })
}
