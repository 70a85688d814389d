use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

pub const ALL_PLATFORMS: &str = "all";

const MAX_TITLE_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Job title must not be empty")]
    EmptyTitle,

    #[error("Job title must be at most {max} characters (got {len})")]
    TitleTooLong { len: usize, max: usize },

    #[error("Unknown platform '{0}'")]
    UnknownPlatform(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

impl SearchQuery {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            location: None,
            platform: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let len = title.chars().count();
        if len > MAX_TITLE_LEN {
            return Err(ValidationError::TitleTooLong {
                len,
                max: MAX_TITLE_LEN,
            });
        }

        Ok(())
    }

    /// Trimmed title as sent upstream.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.trim()
    }

    /// Trimmed location, empty when absent.
    #[must_use]
    pub fn location(&self) -> &str {
        self.location.as_deref().map_or("", str::trim)
    }

    /// Requested platform, `"all"` when absent or blank.
    #[must_use]
    pub fn platform(&self) -> &str {
        match self.platform.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => p,
            _ => ALL_PLATFORMS,
        }
    }

    #[must_use]
    pub fn targets_all_platforms(&self) -> bool {
        self.platform().eq_ignore_ascii_case(ALL_PLATFORMS)
    }

    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::from_query(self)
    }
}

/// Hex SHA-256 fingerprint of the normalized query fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    #[must_use]
    pub fn from_query(query: &SearchQuery) -> Self {
        let fingerprint = format!(
            "{}|{}|{}",
            normalize_component(query.title()),
            normalize_component(query.location()),
            normalize_component(query.platform()),
        );

        let digest = Sha256::digest(fingerprint.as_bytes());
        Self(hex::encode(digest))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CacheKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

fn normalize_component(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
