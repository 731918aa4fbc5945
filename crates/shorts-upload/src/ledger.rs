//! Persistent record of upload attempts.
//!
//! Two append-only text files with one path per line: `uploaded.log` for
//! published files and `failed.log` for files to retry on a later run.

use chrono::Utc;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::UploadResult;

pub const UPLOADED_LOG: &str = "uploaded.log";
pub const FAILED_LOG: &str = "failed.log";

#[derive(Debug, Clone)]
pub struct UploadLedger {
    dir: PathBuf,
    uploaded: HashSet<String>,
    failed: Vec<String>,
}

async fn read_lines(path: &Path) -> UploadResult<Vec<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

async fn append_line(path: &Path, line: &str) -> UploadResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(format!("{}\n", line).as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

/// Ledger key for `path`: canonical when the file or its directory still
/// exists, otherwise absolute with `.` components removed.
fn key(path: &Path) -> String {
    let resolved = std::fs::canonicalize(path)
        .or_else(|_| match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) => std::fs::canonicalize(parent).map(|dir| dir.join(name)),
            _ => Err(std::io::ErrorKind::NotFound.into()),
        })
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf());
    resolved.to_string_lossy().to_string()
}

impl UploadLedger {
    /// Load both logs from `dir`. Missing files are empty logs.
    pub async fn load(dir: impl Into<PathBuf>) -> UploadResult<Self> {
        let dir = dir.into();
        let uploaded: HashSet<String> = read_lines(&dir.join(UPLOADED_LOG)).await?.into_iter().collect();
        let failed = read_lines(&dir.join(FAILED_LOG)).await?;
        debug!(
            dir = %dir.display(),
            uploaded = uploaded.len(),
            failed = failed.len(),
            "Upload ledger loaded"
        );
        Ok(Self { dir, uploaded, failed })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_uploaded(&self, path: &Path) -> bool {
        self.uploaded.contains(&key(path))
    }

    pub async fn record_uploaded(&mut self, path: &Path) -> UploadResult<()> {
        let line = key(path);
        append_line(&self.dir.join(UPLOADED_LOG), &line).await?;
        debug!(path = %line, recorded_at = %Utc::now().to_rfc3339(), "Recorded upload");
        self.uploaded.insert(line);
        Ok(())
    }

    pub async fn record_failed(&mut self, path: &Path) -> UploadResult<()> {
        let line = key(path);
        append_line(&self.dir.join(FAILED_LOG), &line).await?;
        debug!(path = %line, recorded_at = %Utc::now().to_rfc3339(), "Recorded failed upload");
        self.failed.push(line);
        Ok(())
    }

    /// Failed paths that have not been uploaded since, in first-failure order.
    pub fn failed_paths(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        self.failed
            .iter()
            .filter(|p| !self.uploaded.contains(*p) && seen.insert(p.as_str()))
            .map(PathBuf::from)
            .collect()
    }

    pub fn uploaded_count(&self) -> usize {
        self.uploaded.len()
    }
}
