//! Priority-ordered fallback across transcribers.

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use shorts_media::DownloadOptions;
use shorts_models::caption::transcript_chars;
use shorts_models::{is_url, Caption, TranscriberKind};

use crate::assemblyai::AssemblyAiTranscriber;
use crate::error::TranscribeResult;
use crate::official::OfficialTranscript;
use crate::transcriber::{Transcriber, TranscriptOutcome};
use crate::vosk::VoskTranscriber;
use crate::whisper::WhisperTranscriber;

/// Build the engine backend for `kind` from environment configuration.
pub fn engine_for(kind: TranscriberKind) -> TranscribeResult<Box<dyn Transcriber>> {
    Ok(match kind {
        TranscriberKind::Whisper => Box::new(WhisperTranscriber::from_env()),
        TranscriberKind::Vosk => Box::new(VoskTranscriber::from_env()),
        TranscriberKind::AssemblyAi => Box::new(AssemblyAiTranscriber::from_env()?),
    })
}

/// Tries each transcriber in order; the first non-empty result wins.
#[derive(Default)]
pub struct TranscriberChain {
    links: Vec<Box<dyn Transcriber>>,
}

impl TranscriberChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Official transcript first for URL sources, then the `kind` engine.
    /// An engine that cannot be built is left out with a warning.
    pub fn for_source(
        source: &str,
        workdir: impl Into<PathBuf>,
        kind: TranscriberKind,
        options: DownloadOptions,
    ) -> Self {
        let mut chain = Self::new();
        if is_url(source) {
            chain.push(Box::new(
                OfficialTranscript::new(source, workdir).with_download_options(options),
            ));
        }
        match engine_for(kind) {
            Ok(engine) => chain.push(engine),
            Err(e) => warn!(
                transcriber = %kind,
                error = %e,
                "Transcriber unavailable, relying on earlier sources"
            ),
        }
        chain
    }

    pub fn with(mut self, transcriber: impl Transcriber + 'static) -> Self {
        self.links.push(Box::new(transcriber));
        self
    }

    pub fn push(&mut self, transcriber: Box<dyn Transcriber>) {
        self.links.push(transcriber);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.links.iter().map(|t| t.name()).collect()
    }

    /// Run the chain. Misses, transient failures and errors fall through to
    /// the next link; an empty list means every link missed.
    pub async fn transcribe(&self, media: &Path) -> Vec<Caption> {
        for link in &self.links {
            let started = Instant::now();
            match link.transcribe(media).await {
                Ok(TranscriptOutcome::Found(captions)) if !captions.is_empty() => {
                    info!(
                        transcriber = link.name(),
                        captions = captions.len(),
                        chars = transcript_chars(&captions),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Transcript ready"
                    );
                    return captions;
                }
                Ok(TranscriptOutcome::Found(_)) | Ok(TranscriptOutcome::NotFound) => {
                    info!(transcriber = link.name(), "No transcript, trying next");
                }
                Ok(TranscriptOutcome::TransientError(message)) => {
                    warn!(transcriber = link.name(), error = %message, "Transcriber failed, trying next");
                }
                Err(e) => {
                    warn!(
                        transcriber = link.name(),
                        error = %e,
                        configuration = e.is_configuration(),
                        "Transcriber error, trying next"
                    );
                }
            }
        }

        warn!(tried = ?self.names(), "No transcriber produced a transcript");
        Vec::new()
    }
}
