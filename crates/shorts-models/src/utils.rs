//! Source classification helpers.

use url::Url;

/// Errors that can occur during YouTube ID extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YoutubeIdError {
    /// Not a YouTube URL
    InvalidYoutubeUrl,
    /// Video ID has invalid format
    InvalidVideoId,
    /// Video ID not found in URL
    VideoIdNotFound,
}

impl std::fmt::Display for YoutubeIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YoutubeIdError::InvalidYoutubeUrl => write!(f, "URL is not a valid YouTube URL"),
            YoutubeIdError::InvalidVideoId => write!(f, "Video ID has invalid format"),
            YoutubeIdError::VideoIdNotFound => write!(f, "Video ID not found in URL"),
        }
    }
}

impl std::error::Error for YoutubeIdError {}

pub type YoutubeIdResult<T> = Result<T, YoutubeIdError>;

/// Whether the input looks like an http(s) URL rather than a local path.
pub fn is_url(input: &str) -> bool {
    Url::parse(input.trim())
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Extract the 11-character video ID from a YouTube URL.
///
/// Handles `watch?v=`, `youtu.be/`, `/embed/`, `/v/`, `/shorts/` and
/// `/live/` forms.
pub fn extract_youtube_id(input: &str) -> YoutubeIdResult<String> {
    let url = Url::parse(input.trim()).map_err(|_| YoutubeIdError::InvalidYoutubeUrl)?;
    let host = url
        .host_str()
        .ok_or(YoutubeIdError::InvalidYoutubeUrl)?
        .to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let host = host.strip_prefix("m.").unwrap_or(host);

    let candidate = match host {
        "youtu.be" => url.path_segments().and_then(|mut s| s.next()).map(str::to_string),
        "youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
            let from_query = url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned());
            from_query.or_else(|| {
                let segments: Vec<&str> = url.path_segments()?.collect();
                match segments.as_slice() {
                    [kind, id, ..] if matches!(*kind, "embed" | "v" | "shorts" | "live") => {
                        Some(id.to_string())
                    }
                    _ => None,
                }
            })
        }
        _ => return Err(YoutubeIdError::InvalidYoutubeUrl),
    };

    match candidate {
        Some(id) if !id.is_empty() => validate_youtube_id(id),
        _ => Err(YoutubeIdError::VideoIdNotFound),
    }
}

fn validate_youtube_id(id: String) -> YoutubeIdResult<String> {
    let valid = id.len() == 11
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id)
    } else {
        Err(YoutubeIdError::InvalidVideoId)
    }
}
