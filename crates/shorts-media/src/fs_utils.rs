//! Filesystem helpers for rendered output directories.

use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{MediaError, MediaResult};
use crate::render::part_number;

/// Name of the sub-directory holding rendered shorts.
pub const SCENES_DIR: &str = "scenes";

/// Directory that actually holds the `scene_<n>.mp4` files for `dir`: its
/// `scenes/` child when present, `dir` itself otherwise.
pub fn scenes_dir(dir: &Path) -> PathBuf {
    let nested = dir.join(SCENES_DIR);
    if nested.is_dir() {
        nested
    } else {
        dir.to_path_buf()
    }
}

/// List rendered shorts in `dir`, ordered by part number.
pub async fn list_shorts(dir: impl AsRef<Path>) -> MediaResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(MediaError::FileNotFound(dir.to_path_buf()));
    }

    let mut found = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if let Some(part) = part_number(&path) {
            found.push((part, path));
        }
    }

    found.sort_by_key(|(part, _)| *part);
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

/// Whether `path` exists and is a non-empty regular file.
pub async fn is_nonempty_file(path: impl AsRef<Path>) -> bool {
    fs::metadata(path.as_ref())
        .await
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_shorts_sorted_numerically() {
        let dir = TempDir::new().unwrap();
        for name in ["scene_10.mp4", "scene_2.mp4", "scene_1.mp4", "notes.txt", "scene_3.srt"] {
            fs::write(dir.path().join(name), b"x").await.unwrap();
        }

        let shorts = list_shorts(dir.path()).await.unwrap();
        let names: Vec<_> = shorts
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["scene_1.mp4", "scene_2.mp4", "scene_10.mp4"]);
    }

    #[tokio::test]
    async fn test_list_shorts_missing_dir() {
        let result = list_shorts("/nonexistent/scenes").await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_scenes_dir_prefers_nested() {
        let dir = TempDir::new().unwrap();
        assert_eq!(scenes_dir(dir.path()), dir.path());
        fs::create_dir(dir.path().join(SCENES_DIR)).await.unwrap();
        assert_eq!(scenes_dir(dir.path()), dir.path().join(SCENES_DIR));
    }

    #[tokio::test]
    async fn test_is_nonempty_file() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty.mp4");
        fs::write(&empty, b"").await.unwrap();
        assert!(!is_nonempty_file(&empty).await);
        assert!(!is_nonempty_file(dir.path()).await);
        fs::write(&empty, b"data").await.unwrap();
        assert!(is_nonempty_file(&empty).await);
    }
}
