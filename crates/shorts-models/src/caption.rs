//! Transcript captions.

use serde::{Deserialize, Serialize};

/// A caption on the global (unsegmented) source timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Caption text
    pub text: String,
}

impl Caption {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// A caption can be shown only if it has positive duration.
    pub fn is_renderable(&self) -> bool {
        self.end > self.start
    }
}

/// A caption remapped into the local time frame of one segment,
/// `[0, segment_duration]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalCaption {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Total number of characters across captions, used in log lines.
pub fn transcript_chars(captions: &[Caption]) -> usize {
    captions.iter().map(|c| c.text.chars().count()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_renderable() {
        assert!(Caption::new(1.0, 2.0, "hi").is_renderable());
        assert!(!Caption::new(2.0, 2.0, "hi").is_renderable());
        assert!(!Caption::new(3.0, 2.0, "hi").is_renderable());
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&Caption::new(0.5, 1.25, "hello")).unwrap();
        assert_eq!(json, r#"{"start":0.5,"end":1.25,"text":"hello"}"#);
    }
}
