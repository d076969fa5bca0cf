//! Backend configuration resolved from the environment.
//!
//! # Invariants
//! - Blank values fall back to defaults.
//! - `public_base_url` always carries an `http://` or `https://` scheme.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "SNAPNOTE_DB_PATH";
pub const ENV_MEDIA_BUCKET: &str = "SNAPNOTE_MEDIA_BUCKET";
pub const ENV_PUBLIC_BASE_URL: &str = "SNAPNOTE_PUBLIC_BASE_URL";

pub const DEFAULT_DB_FILE_NAME: &str = "snapnote.sqlite3";
pub const DEFAULT_MEDIA_BUCKET: &str = "notes-media";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:54321";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidPublicBaseUrl(String),
    InvalidBucket(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPublicBaseUrl(value) => write!(
                f,
                "{ENV_PUBLIC_BASE_URL} must start with http:// or https://, got `{value}`"
            ),
            Self::InvalidBucket(value) => {
                write!(f, "{ENV_MEDIA_BUCKET} must not contain `/`, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Settings for the embedded backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub db_path: PathBuf,
    pub media_bucket: String,
    pub public_base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            media_bucket: DEFAULT_MEDIA_BUCKET.to_string(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
        }
    }
}

impl BackendConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = non_blank(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(bucket) = non_blank(ENV_MEDIA_BUCKET) {
            if bucket.contains('/') {
                return Err(ConfigError::InvalidBucket(bucket));
            }
            config.media_bucket = bucket;
        }
        if let Some(url) = non_blank(ENV_PUBLIC_BASE_URL) {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidPublicBaseUrl(url));
            }
            config.public_base_url = url;
        }

        Ok(config)
    }
}
