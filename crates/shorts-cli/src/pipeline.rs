//! The end-to-end run: source video in, uploaded shorts out.
//!
//! Strictly sequential. Segments are rendered in timeline order and a
//! Ctrl-C stops the segment loop after the current render; shorts already
//! produced are still reported. Downloads, transcription and scene detection
//! are abandoned on Ctrl-C, and the upload session stops before its next item.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use shorts_media::fs_utils::{scenes_dir, SCENES_DIR};
use shorts_media::render::MIN_RENDER_DURATION;
use shorts_media::{
    check_ffmpeg, check_ffprobe, cut_partition, detect_partition, download_video, probe_duration,
    probe_video, remap_for_segment, render_short, short_output_path, wait_cancelled, write_srt, BackgroundClip,
    FfmpegRunner, FootageCache, FootageCatalog, FootageResolver, MediaError, MediaResult, RenderRequest,
};
use shorts_models::caption::transcript_chars;
use shorts_models::{is_url, Caption, Partition, Segment};
use shorts_transcribe::{cache_id_for_source, TranscriberChain, TranscriptCache};
use shorts_upload::{
    items_for_dir, upload_all, UploadItem, UploadLedger, UploadOptions, UploadPacer, UploadReport,
    VideoHost, YouTubeConfig, YouTubeUploader,
};

use crate::config::AppConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::RunLogger;

/// What a processing run produced.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub video: PathBuf,
    /// Rendered shorts in part order
    pub shorts: Vec<PathBuf>,
    /// Segments left out for falling outside the length bounds
    pub skipped: usize,
    /// Segments whose render failed
    pub failed: usize,
    pub cancelled: bool,
    /// `None` when uploading was disabled or nothing was rendered
    pub upload: Option<UploadReport>,
}

/// Directory that receives the shorts and scratch files for `video`.
///
/// Downloads already live in `<output_dir>/<title>/`; local files get a
/// directory named after their stem under `output_dir`.
pub fn work_dir_for(output_dir: &Path, video: &Path, downloaded: bool) -> PathBuf {
    if downloaded {
        if let Some(parent) = video.parent() {
            return parent.to_path_buf();
        }
    }
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().replace(' ', "_"))
        .unwrap_or_else(|| "video".to_string());
    output_dir.join(stem)
}

/// Segments worth rendering. A single-segment partition is the fallback and
/// is always kept; otherwise segments outside the length bounds are dropped.
pub fn renderable_segments(partition: &Partition, config: &AppConfig) -> (Vec<(usize, Segment)>, usize) {
    let segments: Vec<Segment> = partition.segments().collect();
    let single = segments.len() == 1;
    let mut kept = Vec::with_capacity(segments.len());
    let mut skipped = 0;

    for (idx, segment) in segments.into_iter().enumerate() {
        let duration = segment.duration();
        if duration < MIN_RENDER_DURATION || (!single && !config.segmentation.accepts(duration)) {
            info!(
                part = idx + 1,
                segment = %segment.label(),
                duration,
                min_len = config.segmentation.min_len,
                max_len = config.segmentation.max_len,
                "Segment outside length bounds, skipping"
            );
            skipped += 1;
            continue;
        }
        kept.push((idx + 1, segment));
    }
    (kept, skipped)
}

/// Produces one short from a render request.
#[async_trait]
pub trait ShortRenderer: Send + Sync {
    async fn render(&self, request: &RenderRequest) -> MediaResult<PathBuf>;
}

#[async_trait]
impl ShortRenderer for FfmpegRunner {
    async fn render(&self, request: &RenderRequest) -> MediaResult<PathBuf> {
        render_short(request, self).await
    }
}

pub struct Pipeline {
    config: AppConfig,
    cancel_rx: watch::Receiver<bool>,
    logger: RunLogger,
}

impl Pipeline {
    pub fn new(config: AppConfig, cancel_rx: watch::Receiver<bool>, logger: RunLogger) -> Self {
        Self {
            config,
            cancel_rx,
            logger,
        }
    }

    fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow()
    }

    /// Run `step`, abandoning it with [`MediaError::Cancelled`] on Ctrl-C.
    async fn unless_cancelled<T>(&self, step: impl Future<Output = PipelineResult<T>>) -> PipelineResult<T> {
        let mut cancel_rx = self.cancel_rx.clone();
        tokio::select! {
            result = step => result,
            _ = wait_cancelled(&mut cancel_rx) => {
                warn!("Cancelled, abandoning current step");
                Err(MediaError::Cancelled.into())
            }
        }
    }

    /// Download or locate `source`, render its shorts and upload them.
    pub async fn process(&self, source: &str) -> PipelineResult<RunSummary> {
        let source = source.trim();
        if source.is_empty() {
            return Err(PipelineError::invalid_input("empty source"));
        }
        check_ffmpeg()?;
        check_ffprobe()?;
        self.logger.log_start(source);

        let downloaded = is_url(source);
        let video = self.unless_cancelled(self.resolve_input(source)).await?;
        let work_dir = work_dir_for(&self.config.output_dir, &video, downloaded);
        self.logger.log_progress(&format!("input ready at {}", video.display()));
        match probe_video(&video).await {
            Ok(info) => info!(
                width = info.width,
                height = info.height,
                fps = info.fps,
                duration = info.duration,
                has_audio = info.has_audio,
                "Source video"
            ),
            Err(e) => warn!(path = %video.display(), error = %e, "Could not probe source video"),
        }

        if self.config.cut_only {
            return self.cut_only(video, &work_dir).await;
        }

        let captions = self
            .unless_cancelled(self.transcript(source, &video, &work_dir))
            .await?;
        self.logger
            .log_progress(&format!("transcript has {} captions", captions.len()));

        let partition = self.unless_cancelled(self.partition(&video)).await?;
        let scenes = work_dir.join(SCENES_DIR);
        tokio::fs::create_dir_all(&scenes).await?;

        let runner = self.runner();
        let mut summary = self
            .render_segments(&runner, &video, &captions, &partition, &work_dir, &scenes)
            .await?;

        if summary.shorts.is_empty() {
            if summary.cancelled {
                self.logger.log_warning("cancelled before any short was rendered");
                return Ok(summary);
            }
            return Err(PipelineError::NothingRendered(video));
        }
        self.logger.log_progress(&format!(
            "rendered {} shorts ({} skipped, {} failed)",
            summary.shorts.len(),
            summary.skipped,
            summary.failed
        ));

        if self.config.upload && summary.cancelled {
            info!(dir = %scenes.display(), "Cancelled, skipping upload; shorts left on disk");
        } else if self.config.upload {
            let items = self.upload_items(&scenes, Some(summary.shorts.as_slice())).await?;
            let host = self.youtube().await?;
            summary.upload = Some(self.upload_with(&host, &scenes, &items).await?);
        } else {
            info!(dir = %scenes.display(), "Upload disabled, shorts left on disk");
        }

        self.logger
            .log_completion(&format!("{} shorts in {}", summary.shorts.len(), scenes.display()));
        Ok(summary)
    }

    async fn partition(&self, video: &Path) -> PipelineResult<Partition> {
        let partition = detect_partition(video, &self.config.segmentation).await;
        if partition.is_degenerate() {
            return Err(PipelineError::DegeneratePartition(video.to_path_buf()));
        }
        self.logger.log_progress(&format!(
            "{} segments over {:.1}s",
            partition.segment_count(),
            partition.duration()
        ));
        Ok(partition)
    }

    /// Stream-copy every segment into `<work_dir>/cuts`.
    async fn cut_only(&self, video: PathBuf, work_dir: &Path) -> PipelineResult<RunSummary> {
        let partition = self.unless_cancelled(self.partition(&video)).await?;
        let cuts_dir = work_dir.join("cuts");
        let shorts = cut_partition(&video, &partition, &cuts_dir).await?;
        if shorts.is_empty() {
            return Err(PipelineError::NothingRendered(video));
        }
        self.logger
            .log_completion(&format!("{} cuts in {}", shorts.len(), cuts_dir.display()));
        Ok(RunSummary {
            video,
            shorts,
            ..RunSummary::default()
        })
    }

    /// Upload previously rendered shorts in `dir` without reprocessing.
    pub async fn upload_only(&self, dir: &Path) -> PipelineResult<UploadReport> {
        self.logger.log_start(&dir.display().to_string());
        let dir = scenes_dir(dir);
        let items = self.upload_items(&dir, None).await?;
        let host = self.youtube().await?;
        let report = self.upload_with(&host, &dir, &items).await?;
        self.logger.log_completion(&format!(
            "{} uploaded, {} skipped, {} failed",
            report.uploaded, report.skipped, report.failed
        ));
        Ok(report)
    }

    async fn resolve_input(&self, source: &str) -> PipelineResult<PathBuf> {
        if is_url(source) {
            let path = download_video(source, &self.config.output_dir, &self.config.download_options()).await?;
            return Ok(path);
        }

        let path = PathBuf::from(source);
        if !path.is_file() {
            return Err(PipelineError::SourceNotFound(path));
        }
        info!(path = %path.display(), "Using local video");
        Ok(path)
    }

    /// Cached transcript, else the transcriber chain. Empty is an error.
    async fn transcript(&self, source: &str, video: &Path, work_dir: &Path) -> PipelineResult<Vec<Caption>> {
        let cache = TranscriptCache::new(&self.config.transcript_cache_dir);
        let cache_id = cache_id_for_source(source);
        if let Some(captions) = cache.load(&cache_id).await {
            return Ok(captions);
        }

        let chain = TranscriberChain::for_source(
            source,
            work_dir,
            self.config.transcriber,
            self.config.download_options(),
        );
        let captions = chain.transcribe(video).await;
        if captions.is_empty() {
            return Err(PipelineError::EmptyTranscript(source.to_string()));
        }

        match cache.store(&cache_id, &captions).await {
            Ok(path) => debug!(path = %path.display(), "Transcript cached"),
            Err(e) => warn!(error = %e, "Failed to cache transcript"),
        }
        info!(
            captions = captions.len(),
            chars = transcript_chars(&captions),
            "Transcript ready"
        );
        Ok(captions)
    }

    async fn footage_resolver(&self) -> Option<FootageResolver> {
        if self.config.no_background {
            return None;
        }

        let catalog = match &self.config.footage_catalog {
            Some(path) => match FootageCatalog::load(path).await {
                Ok(catalog) => catalog,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Footage catalog unreadable, using built-in");
                    FootageCatalog::builtin()
                }
            },
            None => FootageCatalog::builtin(),
        };

        match FootageCache::load(&self.config.footage_cache).await {
            Ok(cache) => Some(
                FootageResolver::new(catalog, cache, &self.config.footage_dir)
                    .with_download_options(self.config.download_options()),
            ),
            Err(e) => {
                warn!(error = %e, "Footage cache unreadable, rendering without background");
                None
            }
        }
    }

    /// Footage for one segment, or `None` to render without a background.
    async fn background_for<R: Rng>(
        &self,
        resolver: &mut FootageResolver,
        duration: f64,
        rng: &mut R,
    ) -> Option<BackgroundClip> {
        let path = match resolver.resolve(self.config.game, rng).await {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "No background footage, rendering without it");
                return None;
            }
        };

        let footage_duration = probe_duration(&path).await;
        if footage_duration <= 0.0 {
            warn!(path = %path.display(), "Background footage has no duration, rendering without it");
            return None;
        }
        Some(BackgroundClip::plan(path, footage_duration, duration, rng))
    }

    fn runner(&self) -> FfmpegRunner {
        let runner = FfmpegRunner::new().with_cancel(self.cancel_rx.clone());
        match self.config.render_timeout {
            Some(secs) => runner.with_timeout(secs),
            None => runner,
        }
    }

    async fn render_segments(
        &self,
        renderer: &dyn ShortRenderer,
        video: &Path,
        captions: &[Caption],
        partition: &Partition,
        work_dir: &Path,
        scenes: &Path,
    ) -> PipelineResult<RunSummary> {
        let (segments, skipped) = renderable_segments(partition, &self.config);
        let mut summary = RunSummary {
            video: video.to_path_buf(),
            skipped,
            ..RunSummary::default()
        };

        let mut resolver = self.footage_resolver().await;
        let mut rng = StdRng::from_os_rng();
        let total = segments.len();

        for (done, (part, segment)) in segments.into_iter().enumerate() {
            if self.is_cancelled() {
                warn!(rendered = summary.shorts.len(), remaining = total - done, "Cancelled, stopping renders");
                summary.cancelled = true;
                break;
            }

            let local = remap_for_segment(captions, &segment);
            let srt = work_dir.join(format!("scene_{}.srt", part));
            let cues = write_srt(&local, &srt).await?;

            let output = short_output_path(scenes, part);
            let mut request = RenderRequest::new(video, segment, &output).with_encoding(self.config.encoding.clone());
            if cues > 0 {
                request = request.with_subtitles(&srt);
            }
            if let Some(resolver) = resolver.as_mut() {
                if let Some(background) = self.background_for(resolver, segment.duration(), &mut rng).await {
                    request = request.with_background(background);
                }
            }

            info!(part, total, segment = %segment.label(), cues, "Rendering segment");
            let result = renderer.render(&request).await;
            if let Err(e) = tokio::fs::remove_file(&srt).await {
                debug!(path = %srt.display(), error = %e, "Could not remove subtitle file");
            }

            match result {
                Ok(path) => summary.shorts.push(path),
                Err(MediaError::Cancelled) => {
                    warn!(part, "Render cancelled");
                    summary.cancelled = true;
                    break;
                }
                Err(e) => {
                    error!(part, segment = %segment.label(), error = %e, "Render failed, continuing");
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Upload items for `dir`, restricted to `only` when given.
    async fn upload_items(&self, dir: &Path, only: Option<&[PathBuf]>) -> PipelineResult<Vec<UploadItem>> {
        let mut items = items_for_dir(dir, self.config.privacy).await?;
        if let Some(only) = only {
            items.retain(|item| only.contains(&item.path));
        }
        Ok(items)
    }

    async fn youtube(&self) -> PipelineResult<YouTubeUploader> {
        Ok(YouTubeUploader::from_config(YouTubeConfig::from_env()).await?)
    }

    /// Run an upload session for `items` against `host`.
    pub async fn upload_with(
        &self,
        host: &dyn VideoHost,
        dir: &Path,
        items: &[UploadItem],
    ) -> PipelineResult<UploadReport> {
        let mut ledger = UploadLedger::load(&self.config.ledger_dir).await?;
        let mut pacer = UploadPacer::new(self.config.pacer);
        let options = UploadOptions {
            delete_after_upload: self.config.delete_after_upload,
            cleanup_dir: Some(dir.to_path_buf()),
            cancel: Some(self.cancel_rx.clone()),
        };

        let report = upload_all(host, &mut ledger, &mut pacer, items, &options).await?;
        if report.rate_limited {
            self.logger
                .log_warning("upload limit reached, remaining shorts will be retried on the next run");
        }
        if report.cancelled {
            self.logger
                .log_warning("uploads cancelled, remaining shorts will be uploaded on the next run");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shorts_models::{PrivacyStatus, UploadMetadata};
    use shorts_upload::{PacerMode, UploadOutcome};
    use std::sync::Mutex;
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    struct RecordingHost {
        uploaded: Mutex<Vec<String>>,
    }

    impl RecordingHost {
        fn new() -> Self {
            Self {
                uploaded: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl VideoHost for RecordingHost {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn upload(&self, _path: &Path, meta: &UploadMetadata) -> UploadOutcome {
            self.uploaded.lock().unwrap().push(meta.title.clone());
            UploadOutcome::Uploaded {
                video_id: "abc".into(),
            }
        }
    }

    fn pipeline(config: AppConfig) -> Pipeline {
        let (_tx, rx) = watch::channel(false);
        Pipeline::new(config, rx, RunLogger::with_run_id("test", "test"))
    }

    #[test]
    fn test_work_dir_for() {
        let out = Path::new("/out");
        assert_eq!(
            work_dir_for(out, Path::new("/out/My_Talk/My_Talk.mp4"), true),
            PathBuf::from("/out/My_Talk")
        );
        assert_eq!(
            work_dir_for(out, Path::new("/videos/my talk.mp4"), false),
            PathBuf::from("/out/my_talk")
        );
    }

    #[test]
    fn test_renderable_segments_bounds() {
        let config = AppConfig::default();
        let partition = Partition::from_boundaries(vec![0.0, 30.0, 90.0, 150.0, 155.0]);
        let (kept, skipped) = renderable_segments(&partition, &config);
        let parts: Vec<usize> = kept.iter().map(|(part, _)| *part).collect();
        assert_eq!(parts, vec![1, 2, 3]);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_single_segment_is_always_kept() {
        let config = AppConfig::default();
        let partition = Partition::from_boundaries(vec![0.0, 12.0]);
        let (kept, skipped) = renderable_segments(&partition, &config);
        assert_eq!(kept.len(), 1);
        assert_eq!(skipped, 0);
        assert_eq!(kept[0].1.duration(), 12.0);
    }

    #[tokio::test]
    async fn test_missing_local_source() {
        let tmp = TempDir::new().unwrap();
        let p = pipeline(AppConfig::default());
        let err = assert_err!(
            p.resolve_input(&tmp.path().join("missing.mp4").to_string_lossy())
                .await
        );
        assert!(err.is_input_error());
    }

    #[tokio::test]
    async fn test_upload_only_session() {
        let tmp = TempDir::new().unwrap();
        let scenes = tmp.path().join("My_Talk").join(SCENES_DIR);
        tokio::fs::create_dir_all(&scenes).await.unwrap();
        for part in [2, 1] {
            tokio::fs::write(short_output_path(&scenes, part), b"mp4").await.unwrap();
        }

        let config = AppConfig {
            ledger_dir: tmp.path().join("logs"),
            pacer: PacerMode::None,
            privacy: PrivacyStatus::Unlisted,
            ..AppConfig::default()
        };
        let p = pipeline(config);
        let dir = scenes_dir(&tmp.path().join("My_Talk"));
        let items = assert_ok!(p.upload_items(&dir, None).await);
        assert!(items.iter().all(|i| i.meta.privacy == PrivacyStatus::Unlisted));

        let host = RecordingHost::new();
        let report = p.upload_with(&host, &dir, &items).await.unwrap();
        assert_eq!(report.uploaded, 2);
        assert_eq!(
            *host.uploaded.lock().unwrap(),
            vec!["My Talk - Part 1".to_string(), "My Talk - Part 2".to_string()]
        );

        let again = p.upload_with(&host, &dir, &items).await.unwrap();
        assert_eq!(again.skipped, 2);
        assert_eq!(again.uploaded, 0);
    }

    #[tokio::test]
    async fn test_upload_items_restricted_to_outputs() {
        let tmp = TempDir::new().unwrap();
        let scenes = tmp.path().join("Clip").join(SCENES_DIR);
        tokio::fs::create_dir_all(&scenes).await.unwrap();
        for part in 1..=3 {
            tokio::fs::write(short_output_path(&scenes, part), b"mp4").await.unwrap();
        }

        let p = pipeline(AppConfig::default());
        let only = vec![short_output_path(&scenes, 3)];
        let items = p.upload_items(&scenes, Some(only.as_slice())).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].meta.title, "Clip - Part 3");
    }

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Render,
        RenderThenCancel,
        Fail,
        Cancelled,
    }

    /// Renderer that writes a stub file per request and follows a script.
    struct ScriptedRenderer {
        steps: Mutex<Vec<Step>>,
        cancel_tx: watch::Sender<bool>,
        calls: Mutex<usize>,
    }

    impl ScriptedRenderer {
        fn new(mut steps: Vec<Step>, cancel_tx: watch::Sender<bool>) -> Self {
            steps.reverse();
            Self {
                steps: Mutex::new(steps),
                cancel_tx,
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ShortRenderer for ScriptedRenderer {
        async fn render(&self, request: &RenderRequest) -> MediaResult<PathBuf> {
            *self.calls.lock().unwrap() += 1;
            let step = self.steps.lock().unwrap().pop().unwrap_or(Step::Render);
            match step {
                Step::Fail => return Err(MediaError::internal("encoder crashed")),
                Step::Cancelled => return Err(MediaError::Cancelled),
                Step::Render | Step::RenderThenCancel => {}
            }
            tokio::fs::write(&request.output, b"mp4").await?;
            if matches!(step, Step::RenderThenCancel) {
                self.cancel_tx.send(true).ok();
            }
            Ok(request.output.clone())
        }
    }

    fn cancellable(config: AppConfig) -> (Pipeline, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        (Pipeline::new(config, rx, RunLogger::with_run_id("test", "test")), tx)
    }

    fn no_background() -> AppConfig {
        AppConfig {
            no_background: true,
            ..AppConfig::default()
        }
    }

    fn captions() -> Vec<Caption> {
        vec![Caption::new(1.0, 4.0, "hello"), Caption::new(31.0, 33.0, "again")]
    }

    #[tokio::test]
    async fn test_cancel_keeps_rendered_shorts() {
        let tmp = TempDir::new().unwrap();
        let work_dir = tmp.path().join("Talk");
        let scenes = work_dir.join(SCENES_DIR);
        tokio::fs::create_dir_all(&scenes).await.unwrap();

        let (p, tx) = cancellable(no_background());
        let renderer = ScriptedRenderer::new(vec![Step::RenderThenCancel], tx);
        let partition = Partition::from_boundaries(vec![0.0, 30.0, 60.0, 90.0]);

        let summary = p
            .render_segments(&renderer, Path::new("/videos/talk.mp4"), &captions(), &partition, &work_dir, &scenes)
            .await
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.shorts, vec![short_output_path(&scenes, 1)]);
        assert_eq!(summary.failed, 0);
        assert_eq!(renderer.calls(), 1);
        assert!(summary.shorts[0].exists());
        assert!(!work_dir.join("scene_1.srt").exists());
    }

    #[tokio::test]
    async fn test_failed_render_continues_until_cancelled() {
        let tmp = TempDir::new().unwrap();
        let work_dir = tmp.path().join("Talk");
        let scenes = work_dir.join(SCENES_DIR);
        tokio::fs::create_dir_all(&scenes).await.unwrap();

        let (p, tx) = cancellable(no_background());
        let renderer = ScriptedRenderer::new(vec![Step::Render, Step::Fail, Step::Cancelled], tx);
        let partition = Partition::from_boundaries(vec![0.0, 30.0, 60.0, 90.0, 120.0]);

        let summary = p
            .render_segments(&renderer, Path::new("/videos/talk.mp4"), &captions(), &partition, &work_dir, &scenes)
            .await
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.shorts, vec![short_output_path(&scenes, 1)]);
        assert_eq!(summary.failed, 1);
        assert_eq!(renderer.calls(), 3);
    }

    #[tokio::test]
    async fn test_long_step_abandoned_on_cancel() {
        let (p, tx) = cancellable(AppConfig::default());
        let value = assert_ok!(p.unless_cancelled(async { Ok::<_, PipelineError>(5) }).await);
        assert_eq!(value, 5);

        tx.send(true).unwrap();
        let err = assert_err!(
            p.unless_cancelled(std::future::pending::<PipelineResult<()>>())
                .await
        );
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_upload_session_honors_cancel() {
        let tmp = TempDir::new().unwrap();
        let scenes = tmp.path().join("Clip").join(SCENES_DIR);
        tokio::fs::create_dir_all(&scenes).await.unwrap();
        for part in 1..=2 {
            tokio::fs::write(short_output_path(&scenes, part), b"mp4").await.unwrap();
        }

        let config = AppConfig {
            ledger_dir: tmp.path().join("logs"),
            pacer: PacerMode::None,
            ..AppConfig::default()
        };
        let (p, tx) = cancellable(config);
        let items = p.upload_items(&scenes, None).await.unwrap();
        tx.send(true).unwrap();

        let host = RecordingHost::new();
        let report = p.upload_with(&host, &scenes, &items).await.unwrap();
        assert!(report.cancelled);
        assert_eq!(report.uploaded, 0);
        assert!(host.uploaded.lock().unwrap().is_empty());
        assert!(short_output_path(&scenes, 1).exists());
    }
}
