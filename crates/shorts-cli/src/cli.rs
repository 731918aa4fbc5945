//! Command line surface of the `shorts` binary.

use clap::Parser;
use std::path::PathBuf;

use shorts_models::{BackgroundGame, PrivacyStatus, TranscriberKind};

/// Cut a long video into subtitled vertical shorts and upload them.
#[derive(Debug, Clone, Parser)]
#[command(name = "shorts", version, about)]
pub struct Cli {
    /// Video URL or local file. With --upload-only, a directory of rendered shorts.
    pub source: String,

    /// Upload already rendered scene_<n>.mp4 files without reprocessing
    #[arg(long)]
    pub upload_only: bool,

    /// Render only, skip the upload stage
    #[arg(long, conflicts_with = "upload_only")]
    pub no_upload: bool,

    /// Background footage game (subway_surfers, temple_run, geometry_dash)
    #[arg(long)]
    pub game: Option<BackgroundGame>,

    /// Minimum short length in seconds
    #[arg(long)]
    pub min_len: Option<f64>,

    /// Maximum short length in seconds
    #[arg(long)]
    pub max_len: Option<f64>,

    /// Scene-change sensitivity between 0 and 1
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Speech-to-text engine (whisper, vosk, assemblyai)
    #[arg(long)]
    pub transcriber: Option<TranscriberKind>,

    /// Cut the detected segments with stream copy, without captions, footage or upload
    #[arg(long, conflicts_with = "upload_only")]
    pub cut_only: bool,

    /// Delete each short locally once it is uploaded
    #[arg(long)]
    pub delete_after_upload: bool,

    /// Root directory for downloads and rendered shorts
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Visibility of uploaded shorts (public, unlisted, private)
    #[arg(long)]
    pub privacy: Option<PrivacyStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_only() {
        let cli = Cli::try_parse_from(["shorts", "https://youtu.be/dQw4w9WgXcQ"]).unwrap();
        assert_eq!(cli.source, "https://youtu.be/dQw4w9WgXcQ");
        assert!(!cli.upload_only);
        assert!(!cli.no_upload);
        assert!(cli.game.is_none());
        assert!(cli.transcriber.is_none());
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "shorts",
            "talk.mp4",
            "--no-upload",
            "--game",
            "temple_run",
            "--min-len",
            "15",
            "--max-len",
            "45.5",
            "--threshold",
            "0.6",
            "--transcriber",
            "assemblyai",
            "--delete-after-upload",
            "--privacy",
            "unlisted",
        ])
        .unwrap();

        assert!(cli.no_upload);
        assert_eq!(cli.game, Some(BackgroundGame::TempleRun));
        assert_eq!(cli.min_len, Some(15.0));
        assert_eq!(cli.max_len, Some(45.5));
        assert_eq!(cli.threshold, Some(0.6));
        assert_eq!(cli.transcriber, Some(TranscriberKind::AssemblyAi));
        assert!(cli.delete_after_upload);
        assert_eq!(cli.privacy, Some(PrivacyStatus::Unlisted));
    }

    #[test]
    fn test_upload_only() {
        let cli = Cli::try_parse_from(["shorts", "output/My_Talk", "--upload-only"]).unwrap();
        assert!(cli.upload_only);
        assert_eq!(cli.source, "output/My_Talk");
    }

    #[test]
    fn test_cut_only() {
        let cli = Cli::try_parse_from(["shorts", "talk.mp4", "--cut-only"]).unwrap();
        assert!(cli.cut_only);
        assert!(Cli::try_parse_from(["shorts", "dir", "--upload-only", "--cut-only"]).is_err());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Cli::try_parse_from(["shorts"]).is_err());
        assert!(Cli::try_parse_from(["shorts", "a.mp4", "--game", "minecraft"]).is_err());
        assert!(Cli::try_parse_from(["shorts", "a.mp4", "--transcriber", "siri"]).is_err());
        assert!(Cli::try_parse_from(["shorts", "dir", "--upload-only", "--no-upload"]).is_err());
    }
}
