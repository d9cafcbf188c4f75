//! Image acquisition: the gate between user input and the upload pipeline.
//!
//! Bytes are content-sniffed (never trusted by extension) and turned into a
//! local preview before any network call happens.

use crate::config::Config;
use crate::error::ScanError;
use crate::util::sha256_hex;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::fmt;
use std::path::Path;

/// Canned sample input, usable without picking a file.
pub const SAMPLE_IMAGE: &[u8] = include_bytes!("../assets/sample-device.png");
pub const SAMPLE_NAME: &str = "sample-device.png";

/// A selected image, previewable offline.
///
/// `content_id` (SHA-256 of the bytes) names the session and its artifact
/// directory; `data_url` is the byte-exact local preview.
#[derive(Clone)]
pub struct ImagePreview {
    pub file_name: String,
    pub mime: String,
    pub byte_len: u64,
    pub content_id: String,
    pub data_url: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImagePreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePreview")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("byte_len", &self.byte_len)
            .field("content_id", &self.content_id)
            .finish_non_exhaustive()
    }
}

pub fn preview_from_bytes(
    cfg: &Config,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<ImagePreview, ScanError> {
    if bytes.len() as u64 > cfg.limits.max_image_bytes {
        return Err(ScanError::InvalidInputKind(format!(
            "{} is {} bytes, over the {} byte limit",
            file_name,
            bytes.len(),
            cfg.limits.max_image_bytes
        )));
    }

    let format = image::guess_format(&bytes)
        .map_err(|_| ScanError::InvalidInputKind(format!("{file_name} is not an image file")))?;
    let mime = format.to_mime_type().to_string();

    let content_id = sha256_hex(&bytes);
    let data_url = format!("data:{};base64,{}", mime, BASE64.encode(&bytes));

    Ok(ImagePreview {
        file_name: file_name.to_string(),
        mime,
        byte_len: bytes.len() as u64,
        content_id,
        data_url,
        bytes,
    })
}

pub fn load_path(cfg: &Config, path: &Path) -> Result<ImagePreview, ScanError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ScanError::InvalidInputKind(format!("cannot read {}: {e}", path.display())))?;
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("upload")
        .to_string();
    preview_from_bytes(cfg, &name, bytes)
}

pub fn sample(cfg: &Config) -> Result<ImagePreview, ScanError> {
    preview_from_bytes(cfg, SAMPLE_NAME, SAMPLE_IMAGE.to_vec())
}
