//! `data:` URL codec for inline images.
//!
//! History entries keep the full image inline as `data:<mime>;base64,<payload>`,
//! the same form a webcam screenshot or file preview produces.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64";
pub const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, thiserror::Error)]
pub enum DataUrlError {
    #[error("not a data URL")]
    MissingPrefix,
    #[error("data URL has no payload separator")]
    MissingComma,
    #[error("data URL is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Payload(#[from] base64::DecodeError),
}

/// A decoded data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    #[must_use]
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { mime: mime.into(), bytes }
    }

    /// Parse `data:<mime>;base64,<payload>`. An empty media type reads as
    /// `application/octet-stream`.
    pub fn parse(raw: &str) -> Result<Self, DataUrlError> {
        let rest = raw.trim().strip_prefix(PREFIX).ok_or(DataUrlError::MissingPrefix)?;
        let (meta, payload) = rest.split_once(',').ok_or(DataUrlError::MissingComma)?;
        let mime = meta.strip_suffix(BASE64_MARKER).ok_or(DataUrlError::NotBase64)?;
        let mime = if mime.is_empty() { OCTET_STREAM } else { mime };
        let bytes = STANDARD.decode(payload.trim())?;
        Ok(Self { mime: mime.to_owned(), bytes })
    }

    /// Render as a base64 data URL.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{PREFIX}{}{BASE64_MARKER},{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Guess an image MIME type from magic bytes.
#[must_use]
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xff, 0xd8, 0xff, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'B', b'M', ..] => "image/bmp",
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
#[path = "dataurl_test.rs"]
mod tests;
