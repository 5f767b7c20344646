//! Per-clip processing state machine.
//!
//! Every clip moves through the same gates: output idempotency check,
//! input existence check, (two-stage only) dependency check, probe,
//! rescale, then the external tool pass(es). Each gate maps to a terminal
//! outcome or a typed per-clip error; a failing clip never takes the rest
//! of the run down.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use clipset_media::{filters, probe_video, FfmpegCommand, FfmpegRunner};
use clipset_models::ClipSpec;

use crate::config::PipelineConfig;
use crate::error::{WorkerError, WorkerResult};

/// Audio codec for the remux pass.
const REMUX_AUDIO_CODEC: &str = "aac";
/// CRF passed to the remux pass; FFmpeg consults it only where a stream is
/// re-encoded (the video is stream-copied).
const REMUX_CRF: u8 = 20;

/// Terminal state of one successfully handled clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipOutcome {
    /// The final output already existed; no tool was invoked.
    Skipped,
    /// All production steps completed.
    Done,
}

/// The file paths one clip's processing touches, computed once per clip.
///
/// The final output path doubles as the idempotency gate for re-runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactPaths {
    /// Single-pass trim+crop+mux.
    Single { input: PathBuf, output: PathBuf },
    /// Audio trim plus remux against a previously produced cropped video.
    TwoStage {
        input: PathBuf,
        output: PathBuf,
        /// Intermediate audio-trim artifact
        audio: PathBuf,
        /// Cropped-video artifact the remux consumes
        dependency: PathBuf,
    },
}

impl ArtifactPaths {
    /// Paths for the single-stage pipeline.
    pub fn single_stage(spec: &ClipSpec, config: &PipelineConfig) -> Self {
        Self::Single {
            input: config.input_dir.join(spec.source_filename()),
            output: config.output_dir.join(spec.output_filename()),
        }
    }

    /// Paths for the two-stage pipeline. Fails on source ids too short to
    /// carry the fetch-stage suffix.
    pub fn two_stage(spec: &ClipSpec, config: &PipelineConfig) -> WorkerResult<Self> {
        Ok(Self::TwoStage {
            input: config.input_dir.join(spec.audio_source_filename()?),
            output: config.output_dir.join(spec.remux_filename()?),
            audio: config.output_dir.join(spec.audio_filename()?),
            dependency: config.output_dir.join(spec.dependency_filename()?),
        })
    }

    /// The final artifact this clip produces.
    pub fn output(&self) -> &Path {
        match self {
            Self::Single { output, .. } | Self::TwoStage { output, .. } => output,
        }
    }

    /// The source file this clip reads.
    pub fn input(&self) -> &Path {
        match self {
            Self::Single { input, .. } | Self::TwoStage { input, .. } => input,
        }
    }
}

/// Executes the per-clip state machine for both pipeline variants.
#[derive(Debug, Clone)]
pub struct ClipProcessor {
    config: PipelineConfig,
    runner: FfmpegRunner,
}

impl ClipProcessor {
    pub fn new(config: PipelineConfig) -> Self {
        let runner = match config.tool_timeout_secs {
            Some(secs) => FfmpegRunner::new().with_timeout(secs),
            None => FfmpegRunner::new(),
        };
        Self { config, runner }
    }

    /// Trim, crop and mux one clip in a single FFmpeg pass.
    ///
    /// The video keeps frames `[start_frame, end_frame]` inclusive with
    /// timestamps reset to zero; the audio is trimmed to the matching
    /// `[start/fps, end/fps)` interval so the merged streams stay aligned
    /// within one frame interval.
    pub async fn process_single_stage(&self, spec: &ClipSpec) -> WorkerResult<ClipOutcome> {
        let paths = ArtifactPaths::single_stage(spec, &self.config);
        let ArtifactPaths::Single { input, output } = paths else {
            unreachable!("single_stage builds Single paths");
        };

        if output.exists() {
            info!(source_id = %spec.source_id, output = %output.display(), "output exists, skipping");
            return Ok(ClipOutcome::Skipped);
        }
        if !input.exists() {
            return Err(WorkerError::MissingInput(input));
        }

        let meta = probe_video(&input).await.map_err(WorkerError::Probe)?;
        let window = spec
            .crop
            .rescale(spec.ref_width, spec.ref_height, meta.width, meta.height)?;
        debug!(
            source_id = %spec.source_id,
            width = meta.width,
            height = meta.height,
            fps = %meta.fps,
            window = ?window,
            "probed and rescaled"
        );

        let graph = filters::trim_crop_graph(
            spec.start_frame,
            spec.end_frame,
            &window,
            meta.fps.frame_to_seconds(u64::from(spec.start_frame)),
            meta.fps.frame_to_seconds(u64::from(spec.end_frame)),
        );
        let cmd = FfmpegCommand::new(&output)
            .input(&input)
            .filter_complex(graph)
            .map("[v]")
            .map("[a]");

        self.runner.run(&cmd).await.map_err(WorkerError::Tool)?;

        info!(
            source_id = %spec.source_id,
            output = %output.display(),
            frames = spec.frame_count(),
            "clip produced"
        );
        Ok(ClipOutcome::Done)
    }

    /// Trim the audio stream from the full source, then remux it against
    /// the cropped-video artifact produced by the sibling pipeline.
    ///
    /// The cropped-video dependency is checked up front so a missing
    /// artifact surfaces as [`WorkerError::MissingDependency`] instead of
    /// an opaque tool failure. The audio interval is
    /// `[start/fps, (end+1)/fps)` - the full inclusive frame range.
    pub async fn process_two_stage(&self, spec: &ClipSpec) -> WorkerResult<ClipOutcome> {
        let paths = ArtifactPaths::two_stage(spec, &self.config)?;
        let ArtifactPaths::TwoStage {
            input,
            output,
            audio,
            dependency,
        } = paths
        else {
            unreachable!("two_stage builds TwoStage paths");
        };

        if output.exists() {
            info!(source_id = %spec.source_id, output = %output.display(), "output exists, skipping");
            return Ok(ClipOutcome::Skipped);
        }
        if !input.exists() {
            return Err(WorkerError::MissingInput(input));
        }
        if !dependency.exists() {
            return Err(WorkerError::MissingDependency(dependency));
        }

        let meta = probe_video(&input).await.map_err(WorkerError::Probe)?;
        // The audio pass never crops, but the geometry is still validated
        // against the decoded size so a record that would be degenerate in
        // the sibling pipeline fails the same way here.
        let _window = spec
            .crop
            .rescale(spec.ref_width, spec.ref_height, meta.width, meta.height)?;

        let trim = FfmpegCommand::new(&audio)
            .input(&input)
            .filter_complex(filters::audio_trim(
                meta.fps.frame_to_seconds(u64::from(spec.start_frame)),
                meta.fps.frame_to_seconds(u64::from(spec.end_frame) + 1),
            ))
            .map("[a]");
        self.runner.run(&trim).await.map_err(WorkerError::Tool)?;
        debug!(source_id = %spec.source_id, audio = %audio.display(), "audio trimmed");

        let remux = FfmpegCommand::new(&output)
            .input(&dependency)
            .input(&audio)
            .map("0:v:0")
            .map("1:a:0")
            .video_codec("copy")
            .audio_codec(REMUX_AUDIO_CODEC)
            .crf(REMUX_CRF);
        self.runner.run(&remux).await.map_err(WorkerError::Tool)?;

        info!(
            source_id = %spec.source_id,
            output = %output.display(),
            dependency = %dependency.display(),
            "clip remuxed"
        );
        Ok(ClipOutcome::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipset_models::CropRect;
    use tempfile::TempDir;

    fn spec(source_id: &str) -> ClipSpec {
        ClipSpec {
            source_id: source_id.to_string(),
            ref_height: 720,
            ref_width: 1280,
            start_frame: 30,
            end_frame: 90,
            crop: CropRect::new(100, 50, 600, 400),
        }
    }

    fn config(dir: &TempDir) -> PipelineConfig {
        PipelineConfig {
            input_dir: dir.path().join("in"),
            output_dir: dir.path().join("out"),
            num_workers: 1,
            tool_timeout_secs: None,
        }
    }

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"stub").unwrap();
    }

    #[test]
    fn test_single_stage_paths() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let paths = ArtifactPaths::single_stage(&spec("cliqA"), &config);
        assert_eq!(paths.input(), config.input_dir.join("cliqA.mp4"));
        assert_eq!(
            paths.output(),
            config.output_dir.join("cliqA_S30_E90_L100_T50_R600_B400.mp4")
        );
    }

    #[test]
    fn test_two_stage_paths_converge_on_single_stage_output() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let spec = spec("clip_ab12");

        let single = ArtifactPaths::single_stage(&spec, &config);
        let two = ArtifactPaths::two_stage(&spec, &config).unwrap();
        let ArtifactPaths::TwoStage {
            input,
            output,
            audio,
            dependency,
        } = two
        else {
            panic!("expected two-stage paths");
        };

        // The remux reads exactly what the sibling pipeline writes.
        assert_eq!(dependency, single.output());
        assert_eq!(input, config.input_dir.join("clip_full_ab12.mp4"));
        assert_eq!(
            audio,
            config
                .output_dir
                .join("clip_full_ab12_S30_E90_L100_T50_R600_B400_audio.mp4")
        );
        assert_eq!(
            output,
            config
                .output_dir
                .join("clip_full_ab12_S30_E90_L100_T50_R600_B400.mp4")
        );
    }

    #[tokio::test]
    async fn test_single_stage_skips_existing_output() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let spec = spec("cliqA");
        touch(ArtifactPaths::single_stage(&spec, &config).output());

        let processor = ClipProcessor::new(config);
        let outcome = processor.process_single_stage(&spec).await.unwrap();
        assert_eq!(outcome, ClipOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_single_stage_missing_input() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let spec = spec("cliqA");
        std::fs::create_dir_all(&config.input_dir).unwrap();
        std::fs::create_dir_all(&config.output_dir).unwrap();

        let processor = ClipProcessor::new(config);
        let err = processor.process_single_stage(&spec).await.unwrap_err();
        assert!(matches!(err, WorkerError::MissingInput(_)));
    }

    #[tokio::test]
    async fn test_two_stage_skips_existing_output() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let spec = spec("clip_ab12");
        let paths = ArtifactPaths::two_stage(&spec, &config).unwrap();
        touch(paths.output());

        let processor = ClipProcessor::new(config);
        let outcome = processor.process_two_stage(&spec).await.unwrap();
        assert_eq!(outcome, ClipOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_two_stage_missing_dependency_checked_before_tools() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let spec = spec("clip_ab12");
        // Input exists, cropped-video dependency does not.
        touch(&config.input_dir.join("clip_full_ab12.mp4"));
        std::fs::create_dir_all(&config.output_dir).unwrap();

        let processor = ClipProcessor::new(config);
        let err = processor.process_two_stage(&spec).await.unwrap_err();
        assert!(matches!(err, WorkerError::MissingDependency(_)));
    }

    #[tokio::test]
    async fn test_two_stage_unsplittable_id_fails_per_clip() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let processor = ClipProcessor::new(config);
        let err = processor.process_two_stage(&spec("ab")).await.unwrap_err();
        assert!(matches!(err, WorkerError::Naming(_)));
    }
}
