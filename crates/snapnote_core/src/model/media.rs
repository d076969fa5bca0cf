//! Media attachment helpers.
//!
//! # Responsibility
//! - Map file extensions to upload content types.
//! - Build object-store paths for uploaded attachments.
//! - Abstract picked files behind `MediaSource` so reads can be faked.
//!
//! # Invariants
//! - Extension matching is case-insensitive.
//! - A file name without `.` has no extension and maps to the fallback type.
//! - Object paths always follow `{owner_id}/{unix_millis}-{file_name}`.

use crate::model::user::UserId;
use std::io;
use std::path::PathBuf;

/// Content type used when the extension is unknown or missing.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

const FILE_URI_SCHEME: &str = "file://";

/// Infers the upload content type from a file name.
pub fn content_type_for(file_name: &str) -> &'static str {
    let Some(extension) = file_extension(file_name) else {
        return FALLBACK_CONTENT_TYPE;
    };

    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

/// Returns the last path segment of a picker URI or filesystem path.
pub fn file_name_from_uri(uri: &str) -> &str {
    uri.rsplit(['/', '\\']).next().unwrap_or(uri)
}

/// Builds the object-store path for one upload.
pub fn media_object_path(owner_id: UserId, uploaded_at_ms: i64, file_name: &str) -> String {
    format!("{owner_id}/{uploaded_at_ms}-{file_name}")
}

/// Text after the last `.`, if any and non-empty.
fn file_extension(file_name: &str) -> Option<&str> {
    let (_, extension) = file_name.rsplit_once('.')?;
    (!extension.is_empty()).then_some(extension)
}

/// A user-picked file that can be uploaded as a note attachment.
pub trait MediaSource {
    /// Original locator handed over by the picker.
    fn uri(&self) -> &str;
    /// Reads the full file content.
    fn read_bytes(&self) -> io::Result<Vec<u8>>;

    /// Original file name, derived from the URI.
    fn file_name(&self) -> &str {
        file_name_from_uri(self.uri())
    }
}

/// Picked file on the local filesystem, addressed by path or `file://` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMediaFile {
    uri: String,
}

impl LocalMediaFile {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    /// Filesystem path behind the URI.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(
            self.uri
                .strip_prefix(FILE_URI_SCHEME)
                .unwrap_or(self.uri.as_str()),
        )
    }
}

impl MediaSource for LocalMediaFile {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        std::fs::read(self.path())
    }
}
