//! Pipeline configuration.

use std::io;
use std::path::PathBuf;

/// Default worker count for the crop and fetch pipelines.
pub const DEFAULT_NUM_WORKERS: usize = 8;

/// Default worker count for the audio/remux pipeline.
///
/// That pipeline consumes cropped-video artifacts produced by the sibling
/// crop pipeline, so it stays sequential unless the operator knows stage
/// one has fully completed and raises the flag explicitly.
pub const AUDIO_DEFAULT_NUM_WORKERS: usize = 1;

/// Shared settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding source files
    pub input_dir: PathBuf,
    /// Directory artifacts are written into
    pub output_dir: PathBuf,
    /// Concurrency limit for the worker pool
    pub num_workers: usize,
    /// Optional per-tool-run timeout in seconds
    pub tool_timeout_secs: Option<u64>,
}

impl PipelineConfig {
    /// Build a config; the timeout comes from `CLIPSET_TOOL_TIMEOUT_SECS`
    /// when set.
    pub fn new(input_dir: PathBuf, output_dir: PathBuf, num_workers: usize) -> Self {
        Self {
            input_dir,
            output_dir,
            num_workers: num_workers.max(1),
            tool_timeout_secs: tool_timeout_from_env(),
        }
    }

    /// Fatal startup checks: the input directory must exist and the output
    /// directory is created if needed.
    pub fn prepare(&self) -> io::Result<()> {
        if !self.input_dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("input directory {} does not exist", self.input_dir.display()),
            ));
        }
        std::fs::create_dir_all(&self.output_dir)
    }
}

/// `CLIPSET_TOOL_TIMEOUT_SECS`, if set and parseable.
fn tool_timeout_from_env() -> Option<u64> {
    std::env::var("CLIPSET_TOOL_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
}
