//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Builder for FFmpeg commands.
///
/// Inputs are listed in order; everything added through `output_arg` lands
/// between the last `-i` and the output path, which is where FFmpeg expects
/// filter graphs, stream maps and codec options.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file paths, each emitted as `-i <path>`
    inputs: Vec<PathBuf>,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after the inputs)
    output_args: Vec<String>,
    /// Whether to overwrite the output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command writing to `output`.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add an input file.
    pub fn input(mut self, path: impl AsRef<Path>) -> Self {
        self.inputs.push(path.as_ref().to_path_buf());
        self
    }

    /// Add an output argument.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set a filter graph.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Map a stream or filter label into the output.
    pub fn map(self, label: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(label)
    }

    /// Set the video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set the audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set CRF (quality).
    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    /// Drop all video streams from the output.
    pub fn no_video(self) -> Self {
        self.output_arg("-vn")
    }

    /// The output path this command writes to.
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Build the command-line arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());
        args.push("-nostdin".to_string());

        for input in &self.inputs {
            args.push("-i".to_string());
            args.push(input.to_string_lossy().to_string());
        }

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands with an optional per-run timeout.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    /// Timeout in seconds; `None` blocks until the child exits
    timeout_secs: Option<u64>,
}

impl FfmpegRunner {
    /// Create a new runner with no timeout.
    pub fn new() -> Self {
        Self { timeout_secs: None }
    }

    /// Bound each run to `secs` seconds; the child is killed on expiry.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run an FFmpeg command to completion, checking its exit status.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain stderr concurrently so a chatty child can't fill the pipe
        // and deadlock against our wait.
        let stderr = child.stderr.take().expect("stderr not captured");
        let stderr_handle = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut collected = String::new();
            while let Ok(Some(line)) = lines.next_line().await {
                collected.push_str(&line);
                collected.push('\n');
            }
            collected
        });

        let status = match self.timeout_secs {
            Some(secs) => {
                match tokio::time::timeout(Duration::from_secs(secs), child.wait()).await {
                    Ok(status) => status?,
                    Err(_) => {
                        warn!("FFmpeg timed out after {} seconds, killing process", secs);
                        let _ = child.kill().await;
                        return Err(MediaError::Timeout(secs));
                    }
                }
            }
            None => child.wait().await?,
        };

        let stderr_text = stderr_handle.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(MediaError::ffmpeg_failed(
                format!(
                    "FFmpeg exited with non-zero status writing {}",
                    cmd.output.display()
                ),
                Some(stderr_text),
                status.code(),
            ))
        }
    }
}

/// Check that FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check that FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder_single_input() {
        let cmd = FfmpegCommand::new("out.mp4")
            .input("in.mp4")
            .filter_complex("[0:v]null[v]")
            .map("[v]")
            .audio_codec("aac");

        let args = cmd.build_args();
        assert_eq!(args[0], "-y");
        assert!(args.contains(&"-nostdin".to_string()));
        let i = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[i + 1], "in.mp4");
        assert!(args.contains(&"-filter_complex".to_string()));
        assert!(args.contains(&"[0:v]null[v]".to_string()));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_command_builder_two_inputs_preserve_order() {
        let cmd = FfmpegCommand::new("final.mp4")
            .input("video.mp4")
            .input("audio.mp4")
            .map("0:v:0")
            .map("1:a:0")
            .video_codec("copy")
            .audio_codec("aac");

        let args = cmd.build_args();
        let inputs: Vec<&String> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "-i")
            .map(|(i, _)| &args[i + 1])
            .collect();
        assert_eq!(inputs, ["video.mp4", "audio.mp4"]);

        let cv = args.iter().position(|a| a == "-c:v").unwrap();
        assert_eq!(args[cv + 1], "copy");
    }

    #[test]
    fn test_output_args_follow_inputs() {
        let cmd = FfmpegCommand::new("o.mp4").input("a.mp4").no_video();
        let args = cmd.build_args();
        let i = args.iter().position(|a| a == "-i").unwrap();
        let vn = args.iter().position(|a| a == "-vn").unwrap();
        assert!(vn > i + 1);
    }
}
