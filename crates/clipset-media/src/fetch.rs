//! Source fetching via yt-dlp.
//!
//! The fetch stage's only contract with the rest of the pipeline is that a
//! successful fetch leaves a merged mp4 at `{id}_full.mp4` in the output
//! directory. Failures are returned as typed errors so callers can tell
//! "this source will never exist" apart from an ordinary skip.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Suffix appended to fetched source file names.
pub const FETCHED_SUFFIX: &str = "_full";

/// Errors from fetching a source recording.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("yt-dlp not found in PATH")]
    ToolMissing,

    #[error("fetch failed for {id}: {stderr}")]
    Failed {
        id: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("fetch for {id} exited successfully but produced no file at {path}")]
    OutputMissing { id: String, path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The merged file already existed; nothing was downloaded.
    AlreadyExists,
    /// The source was downloaded and merged.
    Fetched,
}

/// Path the fetch stage produces for a source id.
pub fn fetched_path(output_dir: &Path, id: &str) -> PathBuf {
    output_dir.join(format!("{id}{FETCHED_SUFFIX}.mp4"))
}

/// Fetch one source recording as a merged mp4 at `{id}_full.mp4`.
///
/// Idempotent: an existing file short-circuits without touching the
/// network. The yt-dlp exit status and the presence of the output file are
/// both checked.
pub async fn fetch_source(id: &str, output_dir: &Path) -> Result<FetchOutcome, FetchError> {
    let merged = fetched_path(output_dir, id);
    if merged.exists() {
        debug!(source_id = %id, path = %merged.display(), "fetched file exists, skipping");
        return Ok(FetchOutcome::AlreadyExists);
    }

    which::which("yt-dlp").map_err(|_| FetchError::ToolMissing)?;

    let url = format!("https://www.youtube.com/watch?v={id}");
    let output = Command::new("yt-dlp")
        .args([
            "-f",
            "bv*+ba/b",
            "--merge-output-format",
            "mp4",
            "--no-playlist",
            "-o",
        ])
        .arg(&merged)
        .arg(&url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(FetchError::Failed {
            id: id.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        });
    }

    if !merged.exists() {
        return Err(FetchError::OutputMissing {
            id: id.to_string(),
            path: merged,
        });
    }

    info!(source_id = %id, path = %merged.display(), "source fetched");
    Ok(FetchOutcome::Fetched)
}
