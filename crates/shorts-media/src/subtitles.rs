//! SRT generation and the subtitle burn-in filter.

use std::fmt::Write as _;
use std::path::Path;

use shorts_models::timestamp::{format_srt_timestamp, round_millis};
use shorts_models::LocalCaption;

use crate::error::MediaResult;

/// Appearance of burned-in captions, in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleStyle {
    pub font_name: String,
    pub font_size: u32,
    /// Outline thickness
    pub outline: u32,
    /// Distance from the top of the canvas to the caption block
    pub margin_top: u32,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font_name: "Arial".to_string(),
            font_size: 60,
            outline: 2,
            margin_top: 780,
        }
    }
}

impl SubtitleStyle {
    /// libass `force_style` value for a canvas of the given size.
    ///
    /// Colours are `&HAABBGGRR`: white text with a black outline, top-centre
    /// aligned so the block sits at the seam between the two panels.
    pub fn force_style(&self, canvas_width: u32, canvas_height: u32) -> String {
        format!(
            "PlayResX={},PlayResY={},FontName={},FontSize={},PrimaryColour=&H00FFFFFF,\
             OutlineColour=&H00000000,BorderStyle=1,Outline={},Shadow=0,Alignment=8,MarginV={}",
            canvas_width, canvas_height, self.font_name, self.font_size, self.outline, self.margin_top
        )
    }
}

/// Render captions as an SRT document. Captions that are zero-length at
/// millisecond precision are skipped and cue numbers stay contiguous.
pub fn to_srt(captions: &[LocalCaption]) -> String {
    let mut out = String::new();
    let cues = captions.iter().filter(|c| is_cue(c));

    for (idx, caption) in cues.enumerate() {
        let _ = writeln!(out, "{}", idx + 1);
        let _ = writeln!(
            out,
            "{} --> {}",
            format_srt_timestamp(caption.start),
            format_srt_timestamp(caption.end)
        );
        let _ = writeln!(out, "{}", caption.text.trim());
        out.push('\n');
    }
    out
}

fn is_cue(caption: &LocalCaption) -> bool {
    round_millis(caption.end) > round_millis(caption.start) && !caption.text.trim().is_empty()
}

/// Write captions to an SRT file. Returns the number of cues written.
pub async fn write_srt(captions: &[LocalCaption], path: impl AsRef<Path>) -> MediaResult<usize> {
    let cues = captions.iter().filter(|c| is_cue(c)).count();
    tokio::fs::write(path.as_ref(), to_srt(captions)).await?;
    Ok(cues)
}

/// Escape a path for use inside a quoted filtergraph option.
pub fn escape_filter_path(path: &str) -> String {
    path.replace('\\', "/").replace('\'', "\\'").replace(':', "\\:")
}

/// `subtitles=` filter that burns `srt_path` into the stream.
pub fn subtitle_filter(srt_path: &Path, style: &SubtitleStyle, canvas_width: u32, canvas_height: u32) -> String {
    format!(
        "subtitles=filename='{}':force_style='{}'",
        escape_filter_path(&srt_path.to_string_lossy()),
        style.force_style(canvas_width, canvas_height)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn local(start: f64, end: f64, text: &str) -> LocalCaption {
        LocalCaption {
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_to_srt() {
        let srt = to_srt(&[
            local(0.0, 2.0, "hi"),
            local(3.0, 3.0, "skipped"),
            local(9.0, 10.0, " bye "),
        ]);
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:02,000\nhi\n\n2\n00:00:09,000 --> 00:00:10,000\nbye\n\n"
        );
    }

    #[test]
    fn test_sub_millisecond_caption_is_skipped() {
        let srt = to_srt(&[local(5.0001, 5.0004, "x"), local(5.0004, 5.0016, "y")]);
        assert!(!srt.contains("00:00:05,000 --> 00:00:05,000"));
        assert_eq!(srt, "1\n00:00:05,000 --> 00:00:05,002\ny\n\n");
    }

    #[test]
    fn test_to_srt_empty() {
        assert!(to_srt(&[]).is_empty());
    }

    #[test]
    fn test_escape_filter_path() {
        assert_eq!(escape_filter_path("C:\\tmp\\it's.srt"), "C\\:/tmp/it\\'s.srt");
    }

    #[test]
    fn test_subtitle_filter() {
        let filter = subtitle_filter(Path::new("/tmp/a.srt"), &SubtitleStyle::default(), 1080, 1920);
        assert!(filter.starts_with("subtitles=filename='/tmp/a.srt'"));
        assert!(filter.contains("FontSize=60"));
        assert!(filter.contains("PlayResY=1920"));
        assert!(filter.contains("MarginV=780"));
    }

    #[tokio::test]
    async fn test_write_srt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.srt");
        let count = write_srt(&[local(0.0, 1.0, "a"), local(1.0, 2.5, "b")], &path)
            .await
            .unwrap();
        assert_eq!(count, 2);
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.contains("00:00:01,000 --> 00:00:02,500"));
    }
}
