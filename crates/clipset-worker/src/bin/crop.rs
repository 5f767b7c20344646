//! Single-stage trim+crop pipeline binary.
//!
//! Reads a manifest of per-clip edit instructions and produces one
//! trimmed, cropped, remuxed clip per record.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use clipset_worker::{
    load_manifest, logging, run_pool, ClipProcessor, PipelineConfig, DEFAULT_NUM_WORKERS,
};

/// Trim and crop manifest clips in a single FFmpeg pass per clip.
#[derive(Parser, Debug)]
#[command(name = "clipset-crop", version, about)]
struct Args {
    /// Directory containing source clips
    #[arg(long)]
    input_dir: PathBuf,

    /// File containing per-clip edit instructions
    #[arg(long)]
    clip_info_file: PathBuf,

    /// Location to write outputs
    #[arg(long)]
    output_dir: PathBuf,

    /// How many concurrent workers
    #[arg(long, default_value_t = DEFAULT_NUM_WORKERS)]
    num_workers: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let args = Args::parse();
    let config = PipelineConfig::new(args.input_dir, args.output_dir, args.num_workers);
    config.prepare().context("preparing pipeline directories")?;

    let specs = load_manifest(&args.clip_info_file)
        .with_context(|| format!("loading manifest {}", args.clip_info_file.display()))?;
    info!(
        clips = specs.len(),
        workers = config.num_workers,
        "starting trim+crop run"
    );

    let processor = Arc::new(ClipProcessor::new(config.clone()));
    let tasks: Vec<_> = specs
        .into_iter()
        .map(|spec| {
            let processor = processor.clone();
            async move {
                let result = processor.process_single_stage(&spec).await;
                if let Err(e) = &result {
                    error!(source_id = %spec.source_id, error = %e, "clip failed");
                }
                result
            }
        })
        .collect();

    let summary = run_pool(tasks, config.num_workers).await;
    if summary.failed > 0 {
        std::process::exit(summary.exit_code());
    }
    Ok(())
}
