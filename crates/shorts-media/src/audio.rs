//! Audio extraction for speech recognition.

use std::path::Path;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Sample rate expected by the local speech engines.
pub const SPEECH_SAMPLE_RATE: u32 = 16_000;

/// Build the command converting `input` to 16-bit mono PCM WAV.
pub fn wav_command(input: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .output_arg("-vn")
        .output_arg("-acodec")
        .output_arg("pcm_s16le")
        .output_arg("-ac")
        .output_arg("1")
        .output_arg("-ar")
        .output_arg(SPEECH_SAMPLE_RATE.to_string())
}

/// Extract the audio track of `input` as 16 kHz mono WAV.
pub async fn extract_audio(input: impl AsRef<Path>, output: impl AsRef<Path>) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();
    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    FfmpegRunner::new().run(&wav_command(input, output)).await?;
    info!(input = %input.display(), output = %output.display(), "Audio extracted");
    Ok(())
}
