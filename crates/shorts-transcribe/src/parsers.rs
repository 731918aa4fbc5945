//! Caption parsers for the formats the speech engines emit.
//!
//! All parsers are pure. Malformed cues are skipped rather than failing the
//! whole file.

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::debug;

use shorts_models::timestamp::{parse_timestamp, round_millis};
use shorts_models::Caption;

use crate::error::TranscribeResult;

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid tag regex"))
}

/// Parse a `start --> end [settings]` timing line.
fn parse_cue_timing(line: &str) -> Option<(f64, f64)> {
    let (left, right) = line.split_once("-->")?;
    let start = parse_timestamp(left).ok()?;
    let end = parse_timestamp(right.split_whitespace().next()?).ok()?;
    Some((round_millis(start), round_millis(end)))
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

struct CueBuilder {
    start: f64,
    end: f64,
    lines: Vec<String>,
}

impl CueBuilder {
    fn finish(self) -> Option<Caption> {
        let text = self.lines.join(" ");
        let text = text.trim();
        (!text.is_empty()).then(|| Caption::new(self.start, self.end, text))
    }
}

/// Shared block scanner for SRT and WebVTT.
fn parse_cues(content: &str, clean_markup: bool) -> Vec<Caption> {
    let content = content.trim_start_matches('\u{feff}');
    let mut captions = Vec::new();
    let mut current: Option<CueBuilder> = None;

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() {
            captions.extend(current.take().and_then(CueBuilder::finish));
            continue;
        }

        if let Some((start, end)) = parse_cue_timing(line) {
            captions.extend(current.take().and_then(CueBuilder::finish));
            current = Some(CueBuilder {
                start,
                end,
                lines: Vec::new(),
            });
            continue;
        }

        // Index numbers, headers and NOTE blocks have no open cue
        let Some(cue) = current.as_mut() else {
            continue;
        };
        let text = if clean_markup {
            decode_entities(&tag_regex().replace_all(line, ""))
        } else {
            line.to_string()
        };
        if !text.trim().is_empty() {
            cue.lines.push(text.trim().to_string());
        }
    }
    captions.extend(current.take().and_then(CueBuilder::finish));

    captions
}

/// Parse SubRip (`.srt`) content.
///
/// ```
/// use shorts_transcribe::parsers::parse_srt;
/// let captions = parse_srt("1\n00:00:01,000 --> 00:00:02,500\nHello\n");
/// assert_eq!(captions[0].end, 2.5);
/// ```
pub fn parse_srt(content: &str) -> Vec<Caption> {
    let captions = parse_cues(content, false);
    debug!(cues = captions.len(), "Parsed SRT");
    captions
}

/// Parse WebVTT content.
///
/// Inline tags are removed and consecutive identical cues (rolling captions)
/// are merged into one.
pub fn parse_vtt(content: &str) -> Vec<Caption> {
    let mut merged: Vec<Caption> = Vec::new();
    for caption in parse_cues(content, true) {
        if let Some(last) = merged.last_mut() {
            if last.text == caption.text && caption.start <= last.end + 0.01 {
                last.end = last.end.max(caption.end);
                continue;
            }
        }
        merged.push(caption);
    }
    debug!(cues = merged.len(), "Parsed VTT");
    merged
}

#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    transcription: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    offsets: WhisperOffsets,
    text: String,
}

/// Millisecond offsets.
#[derive(Debug, Deserialize)]
struct WhisperOffsets {
    from: u64,
    to: u64,
}

/// Parse the JSON written by the whisper.cpp CLI with `-oj`.
///
/// Non-speech markers such as `[BLANK_AUDIO]` are dropped.
pub fn parse_whisper_json(json: &str) -> TranscribeResult<Vec<Caption>> {
    let output: WhisperOutput = serde_json::from_str(json)?;

    Ok(output
        .transcription
        .into_iter()
        .filter_map(|segment| {
            let text = segment.text.trim();
            let marker = text.starts_with('[') && text.ends_with(']');
            (!text.is_empty() && !marker).then(|| {
                Caption::new(
                    segment.offsets.from as f64 / 1000.0,
                    segment.offsets.to as f64 / 1000.0,
                    text,
                )
            })
        })
        .collect())
}
