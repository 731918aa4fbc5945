//! Metadata attached to an uploaded short.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default tags applied to every short.
pub const DEFAULT_TAGS: &[&str] = &["shorts", "funny", "scene"];

/// Visibility of an uploaded video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    #[default]
    Public,
    Unlisted,
    Private,
}

impl PrivacyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyStatus::Public => "public",
            PrivacyStatus::Unlisted => "unlisted",
            PrivacyStatus::Private => "private",
        }
    }
}

impl fmt::Display for PrivacyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrivacyStatus {
    type Err = PrivacyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(PrivacyStatus::Public),
            "unlisted" => Ok(PrivacyStatus::Unlisted),
            "private" => Ok(PrivacyStatus::Private),
            _ => Err(PrivacyParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown privacy status: {0}")]
pub struct PrivacyParseError(String);

/// Title, description and flags for one upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub privacy: PrivacyStatus,
    pub made_for_kids: bool,
}

impl UploadMetadata {
    /// Metadata for part `part` (1-based) of a video.
    pub fn for_part(video_name: &str, part: usize, privacy: PrivacyStatus) -> Self {
        let title = if video_name.trim().is_empty() {
            format!("Part {}", part)
        } else {
            format!("{} - Part {}", video_name.trim(), part)
        };

        Self {
            description: format!("{}\n\n#shorts", title),
            title,
            tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
            privacy,
            made_for_kids: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_for_part() {
        let meta = UploadMetadata::for_part("My Video", 3, PrivacyStatus::Public);
        assert_eq!(meta.title, "My Video - Part 3");
        assert!(meta.description.ends_with("#shorts"));
        assert_eq!(meta.tags, vec!["shorts", "funny", "scene"]);
        assert!(!meta.made_for_kids);
    }

    #[test]
    fn test_metadata_without_name() {
        let meta = UploadMetadata::for_part("  ", 1, PrivacyStatus::Private);
        assert_eq!(meta.title, "Part 1");
        assert_eq!(meta.privacy.as_str(), "private");
    }

    #[test]
    fn test_privacy_serde() {
        let json = serde_json::to_string(&PrivacyStatus::Unlisted).unwrap();
        assert_eq!(json, "\"unlisted\"");
    }
}
