//! Upload request validation and naming rules.

use super::aspect::AspectClass;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use std::path::Path;

/// Content types accepted for video uploads.
pub const VIDEO_CONTENT_TYPES: &[&str] = &["video/mp4"];

/// Content types accepted for thumbnail uploads.
pub const THUMBNAIL_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Bytes of randomness behind every generated object or asset name.
pub const RANDOM_NAME_BYTES: usize = 32;

/// One in-flight upload. Consumed by staging and never persisted.
pub struct MediaUpload<S> {
    /// Body chunks as they arrive from the client.
    pub body: S,
    /// `Content-Type` declared for the part, parameters included.
    pub content_type: Option<String>,
    /// Client-side file name; only its extension is used.
    pub file_name: Option<String>,
}

impl<S> MediaUpload<S> {
    pub fn new(body: S, content_type: Option<String>, file_name: Option<String>) -> Self {
        Self {
            body,
            content_type,
            file_name,
        }
    }

    /// Lower-cased extension of the original file name, dot included.
    pub fn extension(&self) -> String {
        self.file_name
            .as_deref()
            .map(file_extension)
            .unwrap_or_default()
    }
}

/// Parse a declared content type and return its essence if it is accepted.
///
/// Parameters such as `; codecs=...` are ignored. Unparseable values are never
/// accepted.
pub fn accepted_media_type(declared: Option<&str>, accepted: &[&str]) -> Option<String> {
    let parsed: mime::Mime = declared?.trim().parse().ok()?;
    let essence = parsed.essence_str().to_ascii_lowercase();
    accepted.contains(&essence.as_str()).then_some(essence)
}

/// `"Clip.MP4"` -> `".mp4"`, `"clip"` -> `""`.
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

fn random_bytes() -> [u8; RANDOM_NAME_BYTES] {
    let mut bytes = [0u8; RANDOM_NAME_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Object key for a video: `<partition>/<64 hex chars><ext>`.
pub fn video_object_key(aspect: AspectClass, extension: &str) -> String {
    format!(
        "{}/{}{}",
        aspect.partition(),
        hex::encode(random_bytes()),
        extension
    )
}

/// File name for a thumbnail asset: base64url of the random bytes plus `<ext>`.
pub fn thumbnail_file_name(extension: &str) -> String {
    format!("{}{}", URL_SAFE_NO_PAD.encode(random_bytes()), extension)
}
