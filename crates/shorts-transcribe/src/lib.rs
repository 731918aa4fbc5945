//! Transcription for the shorts pipeline.
//!
//! Every source of captions implements [`Transcriber`]:
//! - [`OfficialTranscript`]: uploader-provided YouTube subtitles
//! - [`WhisperTranscriber`] and [`VoskTranscriber`]: local speech engines
//! - [`AssemblyAiTranscriber`]: hosted speech-to-text
//!
//! [`TranscriberChain`] tries them in priority order and
//! [`TranscriptCache`] keeps finished transcripts on disk.

pub mod assemblyai;
pub mod cache;
pub mod chain;
pub mod error;
pub mod official;
pub mod parsers;
pub mod transcriber;
pub mod vosk;
pub mod whisper;

pub use assemblyai::{AssemblyAiConfig, AssemblyAiTranscriber};
pub use cache::{cache_id_for_source, TranscriptCache};
pub use chain::{engine_for, TranscriberChain};
pub use error::{TranscribeError, TranscribeResult};
pub use official::OfficialTranscript;
pub use parsers::{parse_srt, parse_vtt, parse_whisper_json};
pub use transcriber::{Transcriber, TranscriptOutcome};
pub use vosk::{VoskConfig, VoskTranscriber};
pub use whisper::{WhisperConfig, WhisperTranscriber};
