//! Vertical short composition.
//!
//! Layout (default 1080x1920): the primary segment is letterboxed into the top
//! panel and the background footage is cropped to its central 65%, muted and
//! scaled to fill the bottom panel. Captions are burned in last, on the
//! stacked frame.
//!
//! Background timing: footage longer than the segment starts at a random
//! offset, shorter footage is looped. The output is always cut to the
//! segment duration.

use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use shorts_models::{EncodingConfig, RenderLayout, Segment};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::subtitles::{subtitle_filter, SubtitleStyle};

/// Segments shorter than this are not rendered.
pub const MIN_RENDER_DURATION: f64 = 0.05;

/// Background footage for one render.
#[derive(Debug, Clone)]
pub struct BackgroundClip {
    pub path: PathBuf,
    /// Seek offset into the footage, `None` to loop from the start
    pub offset: Option<f64>,
}

impl BackgroundClip {
    /// Choose how to cover `segment_duration` seconds with footage of
    /// `footage_duration` seconds.
    pub fn plan<R: Rng>(
        path: impl Into<PathBuf>,
        footage_duration: f64,
        segment_duration: f64,
        rng: &mut R,
    ) -> Self {
        let slack = footage_duration - segment_duration;
        let offset = (slack > 0.0).then(|| rng.random_range(0.0..slack));
        Self {
            path: path.into(),
            offset,
        }
    }

    fn needs_loop(&self) -> bool {
        self.offset.is_none()
    }
}

/// Everything needed to render one short.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Full-length source video
    pub source: PathBuf,
    pub segment: Segment,
    pub output: PathBuf,
    pub background: Option<BackgroundClip>,
    /// SRT file in segment-local time
    pub subtitles: Option<PathBuf>,
    pub layout: RenderLayout,
    pub subtitle_style: SubtitleStyle,
    pub encoding: EncodingConfig,
}

impl RenderRequest {
    pub fn new(source: impl Into<PathBuf>, segment: Segment, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            segment,
            output: output.into(),
            background: None,
            subtitles: None,
            layout: RenderLayout::default(),
            subtitle_style: SubtitleStyle::default(),
            encoding: EncodingConfig::default(),
        }
    }

    pub fn with_background(mut self, background: BackgroundClip) -> Self {
        self.background = Some(background);
        self
    }

    pub fn with_subtitles(mut self, srt: impl Into<PathBuf>) -> Self {
        self.subtitles = Some(srt.into());
        self
    }

    pub fn with_encoding(mut self, encoding: EncodingConfig) -> Self {
        self.encoding = encoding;
        self
    }

    /// The `-filter_complex` graph producing the `[v]` label.
    pub fn filter_graph(&self) -> String {
        let RenderLayout {
            width,
            height,
            primary_height,
            background_crop_ratio,
        } = self.layout;

        let mut graph = match self.background {
            Some(_) => {
                let bottom = self.layout.background_height();
                format!(
                    "[0:v]scale={w}:{ph}:force_original_aspect_ratio=decrease,\
                     pad={w}:{ph}:(ow-iw)/2:(oh-ih)/2,setsar=1[top];\
                     [1:v]crop=iw*{r}:ih:(iw-iw*{r})/2:0,\
                     scale={w}:{bh}:force_original_aspect_ratio=increase,\
                     crop={w}:{bh},setsar=1[bottom];\
                     [top][bottom]vstack=inputs=2",
                    w = width,
                    ph = primary_height,
                    bh = bottom,
                    r = background_crop_ratio,
                )
            }
            None => format!(
                "[0:v]scale={w}:{ph}:force_original_aspect_ratio=decrease,\
                 pad={w}:{ph}:(ow-iw)/2:(oh-ih)/2,pad={w}:{h}:0:0,setsar=1",
                w = width,
                ph = primary_height,
                h = height,
            ),
        };

        if let Some(srt) = &self.subtitles {
            graph.push(',');
            graph.push_str(&subtitle_filter(srt, &self.subtitle_style, width, height));
        }
        graph.push_str("[v]");
        graph
    }

    /// Build the FFmpeg command for this request.
    pub fn to_command(&self) -> FfmpegCommand {
        let duration = self.segment.duration();

        let mut cmd = FfmpegCommand::new(&self.source, &self.output)
            .seek(self.segment.start)
            .duration(duration);

        if let Some(background) = &self.background {
            cmd = cmd.add_input(&background.path);
            cmd = match background.offset {
                Some(offset) => cmd.seek(offset),
                None => cmd,
            };
            if background.needs_loop() {
                cmd = cmd.loop_input();
            }
        }

        cmd.filter_complex(self.filter_graph())
            .map("[v]")
            .map("0:a?")
            .encoding(&self.encoding)
            .output_duration(duration)
            .output_arg("-movflags")
            .output_arg("+faststart")
    }
}

/// Render one short. Returns the output path.
pub async fn render_short(request: &RenderRequest, runner: &FfmpegRunner) -> MediaResult<PathBuf> {
    let duration = request.segment.duration();
    if duration < MIN_RENDER_DURATION {
        return Err(MediaError::InvalidVideo(format!(
            "segment {} is too short to render ({:.3}s)",
            request.segment.label(),
            duration
        )));
    }
    if !request.source.exists() {
        return Err(MediaError::FileNotFound(request.source.clone()));
    }
    if let Some(parent) = request.output.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    info!(
        source = %request.source.display(),
        output = %request.output.display(),
        segment = %request.segment.label(),
        background = ?request.background.as_ref().map(|b| b.path.display().to_string()),
        subtitles = request.subtitles.is_some(),
        "Rendering short"
    );

    let cmd = request.to_command();
    runner
        .run_with_progress(&cmd, move |progress| {
            debug!(
                percent = progress.percentage(duration),
                speed = progress.speed,
                "Render progress"
            );
        })
        .await?;

    info!(output = %request.output.display(), "Short rendered");
    Ok(request.output.clone())
}

/// Output path for the `part`-th (1-based) short in `dir`.
pub fn short_output_path(dir: &Path, part: usize) -> PathBuf {
    dir.join(format!("scene_{}.mp4", part))
}

/// Part number parsed back from a `scene_<n>.mp4` file name.
pub fn part_number(path: &Path) -> Option<usize> {
    let stem = path.file_stem()?.to_str()?;
    if path.extension()?.to_str()? != "mp4" {
        return None;
    }
    stem.strip_prefix("scene_")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn segment(start: f64, end: f64) -> Segment {
        Segment::new(start, end).unwrap()
    }

    #[test]
    fn test_plan_random_offset_within_slack() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let clip = BackgroundClip::plan("bg.mp4", 300.0, 45.0, &mut rng);
            let offset = clip.offset.unwrap();
            assert!((0.0..255.0).contains(&offset));
        }
    }

    #[test]
    fn test_plan_loops_short_footage() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(BackgroundClip::plan("bg.mp4", 30.0, 45.0, &mut rng).needs_loop());
        assert!(BackgroundClip::plan("bg.mp4", 45.0, 45.0, &mut rng).needs_loop());
    }

    #[test]
    fn test_filter_graph_with_background_and_subtitles() {
        let request = RenderRequest::new("src.mp4", segment(10.0, 40.0), "out/scene_1.mp4")
            .with_background(BackgroundClip {
                path: "bg.mp4".into(),
                offset: Some(12.0),
            })
            .with_subtitles("out/scene_1.srt");
        let graph = request.filter_graph();

        assert!(graph.contains("[0:v]scale=1080:840"));
        assert!(graph.contains("crop=iw*0.65:ih"));
        assert!(graph.contains("crop=1080:1080"));
        assert!(graph.contains("vstack=inputs=2,subtitles="));
        assert!(graph.ends_with("[v]"));
    }

    #[test]
    fn test_filter_graph_without_background() {
        let request = RenderRequest::new("src.mp4", segment(0.0, 30.0), "out.mp4");
        let graph = request.filter_graph();
        assert!(graph.contains("pad=1080:1920:0:0"));
        assert!(!graph.contains("[1:v]"));
        assert!(!graph.contains("subtitles"));
    }

    #[test]
    fn test_command_seeks_and_loops() {
        let looped = RenderRequest::new("src.mp4", segment(10.0, 40.0), "out.mp4")
            .with_background(BackgroundClip {
                path: "bg.mp4".into(),
                offset: None,
            })
            .to_command()
            .build_args();
        let src = looped.iter().position(|a| a == "src.mp4").unwrap();
        let bg = looped.iter().position(|a| a == "bg.mp4").unwrap();
        let lp = looped.iter().position(|a| a == "-stream_loop").unwrap();
        assert!(src < lp && lp < bg);
        assert!(looped.contains(&"10.000".to_string()));
        assert!(looped.contains(&"30.000".to_string()));
        assert!(looped.contains(&"0:a?".to_string()));
    }

    #[tokio::test]
    async fn test_render_rejects_tiny_segment() {
        let request = RenderRequest::new("src.mp4", segment(5.0, 5.01), "out.mp4");
        let result = render_short(&request, &FfmpegRunner::new()).await;
        assert!(matches!(result, Err(MediaError::InvalidVideo(_))));
    }

    #[test]
    fn test_part_number() {
        let dir = Path::new("/tmp/scenes");
        assert_eq!(part_number(&short_output_path(dir, 12)), Some(12));
        assert_eq!(part_number(Path::new("scene_x.mp4")), None);
        assert_eq!(part_number(Path::new("scene_3.srt")), None);
        assert_eq!(part_number(Path::new("clip_3.mp4")), None);
    }
}
