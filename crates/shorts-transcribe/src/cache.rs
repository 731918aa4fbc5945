//! On-disk transcript cache.
//!
//! Stores caption lists as gzip-compressed JSON so a re-run on the same
//! source skips transcription entirely.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use shorts_models::{extract_youtube_id, Caption};

use crate::error::TranscribeResult;

/// Stable cache id for a source URL or path.
///
/// - Uses the YouTube video id when available
/// - Falls back to the SHA-256 of the trimmed source string
pub fn cache_id_for_source(source: &str) -> String {
    if let Ok(id) = extract_youtube_id(source) {
        return id;
    }

    let digest = Sha256::digest(source.trim().as_bytes());
    format!("{:x}", digest)
}

/// Serialize and gzip captions.
pub fn compress_captions(captions: &[Caption]) -> TranscribeResult<Vec<u8>> {
    let json = serde_json::to_vec(captions)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

/// Inverse of [`compress_captions`]. Returns `None` for corrupt data.
pub fn decompress_captions(data: &[u8]) -> Option<Vec<Caption>> {
    let mut decoder = GzDecoder::new(data);
    let mut json = String::new();

    if let Err(e) = decoder.read_to_string(&mut json) {
        warn!(error = %e, "Failed to decompress transcript cache");
        return None;
    }

    match serde_json::from_str(&json) {
        Ok(captions) => Some(captions),
        Err(e) => {
            warn!(error = %e, "Transcript cache entry is not a caption list");
            None
        }
    }
}

/// Directory of `<cache_id>.json.gz` entries.
#[derive(Debug, Clone)]
pub struct TranscriptCache {
    dir: PathBuf,
}

impl TranscriptCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Format: `{dir}/{cache_id}.json.gz`
    pub fn entry_path(&self, cache_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json.gz", cache_id))
    }

    /// Cached captions, or `None` on a miss or a corrupt entry.
    pub async fn load(&self, cache_id: &str) -> Option<Vec<Caption>> {
        let path = self.entry_path(cache_id);

        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Transcript cache miss");
                return None;
            }
        };

        match decompress_captions(&data) {
            Some(captions) if !captions.is_empty() => {
                info!(path = %path.display(), captions = captions.len(), "Transcript cache hit");
                Some(captions)
            }
            _ => {
                debug!(path = %path.display(), "Transcript cache miss (corrupt or empty)");
                None
            }
        }
    }

    /// Store captions, replacing any previous entry.
    pub async fn store(&self, cache_id: &str, captions: &[Caption]) -> TranscribeResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.entry_path(cache_id);
        let compressed = compress_captions(captions)?;

        debug!(
            path = %path.display(),
            compressed_size = compressed.len(),
            "Storing transcript cache entry"
        );

        let tmp = path.with_extension("gz.tmp");
        tokio::fs::write(&tmp, &compressed).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }

    pub async fn remove(&self, cache_id: &str) -> TranscribeResult<()> {
        match tokio::fs::remove_file(self.entry_path(cache_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
