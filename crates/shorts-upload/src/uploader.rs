//! The upload session loop.

use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{error, info, warn};

use shorts_media::fs_utils::{list_shorts, SCENES_DIR};
use shorts_media::render::part_number;
use shorts_models::{PrivacyStatus, UploadMetadata};

use crate::error::{UploadError, UploadResult};
use crate::host::{UploadOutcome, VideoHost};
use crate::ledger::UploadLedger;
use crate::pacer::UploadPacer;

/// One file and the metadata to publish it with.
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub path: PathBuf,
    pub meta: UploadMetadata,
}

#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Remove each local file once it is known to be uploaded
    pub delete_after_upload: bool,
    /// Directory removed at the end of the session if it is left empty
    pub cleanup_dir: Option<PathBuf>,
    /// Stops the session before the next upload once it reads `true`
    pub cancel: Option<watch::Receiver<bool>>,
}

/// Tally of one upload session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded: usize,
    pub skipped: usize,
    pub failed: usize,
    /// The host signalled a quota or upload limit and the session stopped
    pub rate_limited: bool,
    /// Interrupted before every item was attempted
    pub cancelled: bool,
}

impl UploadReport {
    pub fn attempted(&self) -> usize {
        self.uploaded + self.failed + usize::from(self.rate_limited)
    }
}

/// Human-readable video name for a scenes directory:
/// `/out/My_Talk/scenes` -> `My Talk`.
pub fn video_name_for(dir: &Path) -> String {
    let dir = match dir.file_name() {
        Some(name) if name == SCENES_DIR => dir.parent().unwrap_or(dir),
        _ => dir,
    };
    dir.file_name()
        .map(|n| n.to_string_lossy().replace('_', " "))
        .unwrap_or_default()
}

/// Upload items for every `scene_<n>.mp4` in `dir`, titled by part number.
pub async fn items_for_dir(dir: &Path, privacy: PrivacyStatus) -> UploadResult<Vec<UploadItem>> {
    if !dir.is_dir() {
        return Err(UploadError::DirectoryNotFound(dir.to_path_buf()));
    }
    let shorts = list_shorts(dir)
        .await
        .map_err(|e| UploadError::config_error(format!("cannot list {}: {}", dir.display(), e)))?;
    if shorts.is_empty() {
        return Err(UploadError::NothingToUpload(dir.to_path_buf()));
    }

    let name = video_name_for(dir);
    Ok(shorts
        .into_iter()
        .enumerate()
        .map(|(idx, path)| {
            let part = part_number(&path).unwrap_or(idx + 1);
            UploadItem {
                meta: UploadMetadata::for_part(&name, part, privacy),
                path,
            }
        })
        .collect())
}

async fn delete_local(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!(path = %path.display(), "Local file deleted"),
        Err(e) => error!(path = %path.display(), error = %e, "Failed to delete local file"),
    }
}

async fn remove_if_empty(dir: &Path) {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(_) => return,
    };
    if let Ok(Some(_)) = entries.next_entry().await {
        return;
    }
    match tokio::fs::remove_dir(dir).await {
        Ok(()) => info!(dir = %dir.display(), "Upload directory is empty, removed it"),
        Err(e) => error!(dir = %dir.display(), error = %e, "Failed to remove empty directory"),
    }
}

/// Upload `items` in order.
///
/// Ledger-recorded files are skipped. A failed upload is recorded and the
/// session moves on; a rate-limited one is recorded and ends the session so
/// the rest are retried on a later run. A raised cancel flag ends the session
/// before the next upload, including during the pacing wait.
pub async fn upload_all(
    host: &dyn VideoHost,
    ledger: &mut UploadLedger,
    pacer: &mut UploadPacer,
    items: &[UploadItem],
    options: &UploadOptions,
) -> UploadResult<UploadReport> {
    let mut report = UploadReport::default();
    let total = items.len();
    let mut cancel_rx = options.cancel.clone();

    for (idx, item) in items.iter().enumerate() {
        if cancel_rx.as_ref().is_some_and(|rx| *rx.borrow()) {
            warn!(remaining = total - idx, "Cancelled, stopping uploads");
            report.cancelled = true;
            break;
        }

        if ledger.is_uploaded(&item.path) {
            info!(path = %item.path.display(), "Already uploaded, skipping");
            report.skipped += 1;
            if options.delete_after_upload {
                delete_local(&item.path).await;
            }
            continue;
        }

        let ready = match cancel_rx.as_mut() {
            Some(rx) => pacer.wait_or_cancel(rx).await,
            None => {
                pacer.wait().await;
                true
            }
        };
        if !ready {
            warn!(remaining = total - idx, "Cancelled while waiting, stopping uploads");
            report.cancelled = true;
            break;
        }

        info!(
            host = host.name(),
            part = idx + 1,
            total,
            title = %item.meta.title,
            "Uploading short"
        );

        match host.upload(&item.path, &item.meta).await {
            UploadOutcome::Uploaded { video_id } => {
                ledger.record_uploaded(&item.path).await?;
                report.uploaded += 1;
                info!(path = %item.path.display(), video_id = %video_id, "Short uploaded");
                if options.delete_after_upload {
                    delete_local(&item.path).await;
                }
            }
            UploadOutcome::RateLimited(reason) => {
                ledger.record_failed(&item.path).await?;
                report.rate_limited = true;
                warn!(
                    reason = %reason,
                    remaining = total - idx - 1,
                    "Upload limit reached, stopping uploads for this run"
                );
                break;
            }
            UploadOutcome::Failed(reason) => {
                ledger.record_failed(&item.path).await?;
                report.failed += 1;
                error!(path = %item.path.display(), reason = %reason, "Upload failed, continuing");
            }
        }
    }

    if let Some(dir) = &options.cleanup_dir {
        remove_if_empty(dir).await;
    }

    info!(
        uploaded = report.uploaded,
        skipped = report.skipped,
        failed = report.failed,
        rate_limited = report.rate_limited,
        cancelled = report.cancelled,
        "Upload session finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacer::PacerMode;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    /// Host that replays scripted outcomes and records the titles it saw.
    struct ScriptedHost {
        outcomes: Mutex<Vec<UploadOutcome>>,
        titles: Mutex<Vec<String>>,
    }

    impl ScriptedHost {
        fn new(mut outcomes: Vec<UploadOutcome>) -> Self {
            outcomes.reverse();
            Self {
                outcomes: Mutex::new(outcomes),
                titles: Mutex::new(Vec::new()),
            }
        }

        fn titles(&self) -> Vec<String> {
            self.titles.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VideoHost for ScriptedHost {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn upload(&self, _path: &Path, meta: &UploadMetadata) -> UploadOutcome {
            self.titles.lock().unwrap().push(meta.title.clone());
            self.outcomes
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(UploadOutcome::Failed("no script".into()))
        }
    }

    fn uploaded(id: &str) -> UploadOutcome {
        UploadOutcome::Uploaded { video_id: id.into() }
    }

    async fn scenes(dir: &Path, count: usize) -> PathBuf {
        let scenes = dir.join("My_Talk").join(SCENES_DIR);
        tokio::fs::create_dir_all(&scenes).await.unwrap();
        for part in 1..=count {
            tokio::fs::write(scenes.join(format!("scene_{}.mp4", part)), b"mp4").await.unwrap();
        }
        scenes
    }

    #[test]
    fn test_video_name_for() {
        assert_eq!(video_name_for(Path::new("/out/My_Talk/scenes")), "My Talk");
        assert_eq!(video_name_for(Path::new("/out/Other_Video")), "Other Video");
    }

    #[tokio::test]
    async fn test_items_for_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = scenes(tmp.path(), 3).await;
        let items = items_for_dir(&dir, PrivacyStatus::Public).await.unwrap();
        let titles: Vec<_> = items.iter().map(|i| i.meta.title.as_str()).collect();
        assert_eq!(titles, vec!["My Talk - Part 1", "My Talk - Part 2", "My Talk - Part 3"]);

        assert!(matches!(
            items_for_dir(&tmp.path().join("missing"), PrivacyStatus::Public).await,
            Err(UploadError::DirectoryNotFound(_))
        ));
        let empty = tmp.path().join("empty");
        tokio::fs::create_dir(&empty).await.unwrap();
        assert!(matches!(
            items_for_dir(&empty, PrivacyStatus::Public).await,
            Err(UploadError::NothingToUpload(_))
        ));
    }

    #[tokio::test]
    async fn test_failure_continues_and_rate_limit_stops() {
        let tmp = TempDir::new().unwrap();
        let dir = scenes(tmp.path(), 4).await;
        let items = items_for_dir(&dir, PrivacyStatus::Public).await.unwrap();
        let host = ScriptedHost::new(vec![
            uploaded("a"),
            UploadOutcome::Failed("500".into()),
            UploadOutcome::RateLimited("uploadLimitExceeded".into()),
            uploaded("never"),
        ]);
        let mut ledger = UploadLedger::load(tmp.path().join("logs")).await.unwrap();
        let mut pacer = UploadPacer::none();

        let report = upload_all(&host, &mut ledger, &mut pacer, &items, &UploadOptions::default())
            .await
            .unwrap();

        assert_eq!(
            report,
            UploadReport {
                uploaded: 1,
                skipped: 0,
                failed: 1,
                rate_limited: true,
                cancelled: false
            }
        );
        assert_eq!(host.titles().len(), 3);
        assert!(ledger.is_uploaded(&items[0].path));
        assert_eq!(ledger.failed_paths(), vec![items[1].path.clone(), items[2].path.clone()]);
    }

    #[tokio::test]
    async fn test_rerun_skips_uploaded() {
        let tmp = TempDir::new().unwrap();
        let dir = scenes(tmp.path(), 2).await;
        let items = items_for_dir(&dir, PrivacyStatus::Public).await.unwrap();
        let mut ledger = UploadLedger::load(tmp.path().join("logs")).await.unwrap();
        ledger.record_uploaded(&items[0].path).await.unwrap();

        let host = ScriptedHost::new(vec![uploaded("b")]);
        let report = upload_all(&host, &mut ledger, &mut UploadPacer::none(), &items, &UploadOptions::default())
            .await
            .unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.uploaded, 1);
        assert_eq!(host.titles(), vec!["My Talk - Part 2"]);
    }

    #[tokio::test]
    async fn test_delete_after_upload_removes_empty_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = scenes(tmp.path(), 2).await;
        let items = items_for_dir(&dir, PrivacyStatus::Public).await.unwrap();
        let mut ledger = UploadLedger::load(tmp.path().join("logs")).await.unwrap();
        let options = UploadOptions {
            delete_after_upload: true,
            cleanup_dir: Some(dir.clone()),
            ..UploadOptions::default()
        };

        let host = ScriptedHost::new(vec![uploaded("a"), uploaded("b")]);
        let report = upload_all(&host, &mut ledger, &mut UploadPacer::none(), &items, &options)
            .await
            .unwrap();

        assert_eq!(report.uploaded, 2);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_failed_file_is_kept() {
        let tmp = TempDir::new().unwrap();
        let dir = scenes(tmp.path(), 1).await;
        let items = items_for_dir(&dir, PrivacyStatus::Public).await.unwrap();
        let mut ledger = UploadLedger::load(tmp.path().join("logs")).await.unwrap();
        let options = UploadOptions {
            delete_after_upload: true,
            cleanup_dir: Some(dir.clone()),
            ..UploadOptions::default()
        };

        let host = ScriptedHost::new(vec![UploadOutcome::Failed("boom".into())]);
        let report = upload_all(&host, &mut ledger, &mut UploadPacer::none(), &items, &options)
            .await
            .unwrap();

        assert_eq!(report.failed, 1);
        assert!(items[0].path.exists());
        assert!(dir.exists());
    }

    #[tokio::test]
    async fn test_cancel_during_pacing_stops_session() {
        let tmp = TempDir::new().unwrap();
        let dir = scenes(tmp.path(), 3).await;
        let items = items_for_dir(&dir, PrivacyStatus::Public).await.unwrap();
        let mut ledger = UploadLedger::load(tmp.path().join("logs")).await.unwrap();
        let mut pacer = UploadPacer::new(PacerMode::Randomized {
            min: Duration::from_secs(600),
            max: Duration::from_secs(1200),
        });
        let (tx, rx) = watch::channel(false);
        let options = UploadOptions {
            cancel: Some(rx),
            ..UploadOptions::default()
        };
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            tx.send(true).ok();
        });

        let host = ScriptedHost::new(vec![uploaded("a"), uploaded("b"), uploaded("c")]);
        let started = Instant::now();
        let report = upload_all(&host, &mut ledger, &mut pacer, &items, &options)
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(report.cancelled);
        assert_eq!(report.uploaded, 1);
        assert_eq!(host.titles(), vec!["My Talk - Part 1"]);
        assert!(!ledger.is_uploaded(&items[1].path));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_uploads_nothing() {
        let tmp = TempDir::new().unwrap();
        let dir = scenes(tmp.path(), 2).await;
        let items = items_for_dir(&dir, PrivacyStatus::Public).await.unwrap();
        let mut ledger = UploadLedger::load(tmp.path().join("logs")).await.unwrap();
        let (_tx, rx) = watch::channel(true);
        let options = UploadOptions {
            cancel: Some(rx),
            ..UploadOptions::default()
        };

        let host = ScriptedHost::new(vec![uploaded("a")]);
        let report = upload_all(&host, &mut ledger, &mut UploadPacer::none(), &items, &options)
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.attempted(), 0);
        assert!(host.titles().is_empty());
    }
}
