//! FFprobe media metadata.

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Exact frame rate as a ratio of two integers.
///
/// Kept rational rather than collapsed to a float so frame-to-time
/// conversion does not drift over long clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub num: u32,
    pub den: u32,
}

impl Rational {
    /// Parse the strict `"num/den"` form FFprobe reports frame rates in.
    ///
    /// Anything else is rejected: bare decimals, the `0/0` FFprobe emits
    /// for unknown rates, and any expression syntax. The string is parsed
    /// numerically, never evaluated.
    pub fn parse(s: &str) -> Option<Self> {
        let (num, den) = s.trim().split_once('/')?;
        let num: u32 = num.parse().ok()?;
        let den: u32 = den.parse().ok()?;
        if num == 0 || den == 0 {
            return None;
        }
        Some(Self { num, den })
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Presentation time of `frame` in seconds: `frame * den / num`.
    pub fn frame_to_seconds(&self, frame: u64) -> f64 {
        frame as f64 * f64::from(self.den) / f64::from(self.num)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Decoded stream properties of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaMetadata {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate as an exact ratio
    pub fps: Rational,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
}

/// Probe a source file for decoded size and frame rate.
///
/// Shells out to `ffprobe` and parses its JSON report. Metadata is
/// recomputed on every call; clips sharing a source pay the probe again.
pub async fn probe_video(path: impl AsRef<Path>) -> MediaResult<MediaMetadata> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("ffprobe failed for {}", path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
    metadata_from_probe(path, &probe)
}

/// Extract the video stream's metadata from a parsed FFprobe report.
fn metadata_from_probe(path: &Path, probe: &FfprobeOutput) -> MediaResult<MediaMetadata> {
    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| MediaError::NoVideoStream(path.to_path_buf()))?;

    let width = video
        .width
        .ok_or_else(|| MediaError::InvalidVideo(format!("missing width in {}", path.display())))?;
    let height = video
        .height
        .ok_or_else(|| MediaError::InvalidVideo(format!("missing height in {}", path.display())))?;

    let rate = video
        .avg_frame_rate
        .as_deref()
        .or(video.r_frame_rate.as_deref())
        .unwrap_or("");
    let fps = Rational::parse(rate).ok_or_else(|| MediaError::InvalidFrameRate(rate.to_string()))?;

    Ok(MediaMetadata { width, height, fps })
}
