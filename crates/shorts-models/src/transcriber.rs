//! Speech-to-text engine selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Available transcription engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriberKind {
    /// whisper.cpp command line
    #[default]
    Whisper,
    /// Vosk offline recognizer
    Vosk,
    /// AssemblyAI hosted API
    AssemblyAi,
}

impl TranscriberKind {
    pub const ALL: &'static [TranscriberKind] = &[
        TranscriberKind::Whisper,
        TranscriberKind::Vosk,
        TranscriberKind::AssemblyAi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriberKind::Whisper => "whisper",
            TranscriberKind::Vosk => "vosk",
            TranscriberKind::AssemblyAi => "assemblyai",
        }
    }
}

impl fmt::Display for TranscriberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranscriberKind {
    type Err = TranscriberParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "whisper" => Ok(TranscriberKind::Whisper),
            "vosk" => Ok(TranscriberKind::Vosk),
            "assemblyai" | "assembly_ai" | "assembly" => Ok(TranscriberKind::AssemblyAi),
            _ => Err(TranscriberParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown transcriber: {0} (expected whisper, vosk or assemblyai)")]
pub struct TranscriberParseError(String);
