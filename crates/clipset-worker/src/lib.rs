//! Pipeline orchestration for clipset.
//!
//! Ties the models and media crates together: manifest loading, the
//! per-clip processing state machine, and the bounded worker pool the
//! three binaries run their clips through.

pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod pool;
pub mod processor;

// Re-export common types
pub use config::{PipelineConfig, AUDIO_DEFAULT_NUM_WORKERS, DEFAULT_NUM_WORKERS};
pub use error::{WorkerError, WorkerResult};
pub use manifest::{load_manifest, ManifestReader};
pub use pool::{run_pool, RunSummary};
pub use processor::{ArtifactPaths, ClipOutcome, ClipProcessor};
