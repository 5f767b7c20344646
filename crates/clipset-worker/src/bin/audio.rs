//! Two-stage audio/remux pipeline binary.
//!
//! For each manifest record, trims the audio stream from the full fetched
//! source, then remuxes it against the cropped-video artifact the
//! single-stage pipeline produced for the same record.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use clipset_worker::{
    load_manifest, logging, run_pool, ClipProcessor, PipelineConfig, AUDIO_DEFAULT_NUM_WORKERS,
};

/// Trim audio and remux it against previously cropped video artifacts.
#[derive(Parser, Debug)]
#[command(name = "clipset-audio", version, about)]
struct Args {
    /// Directory containing full fetched sources
    #[arg(long)]
    input_dir: PathBuf,

    /// File containing per-clip edit instructions
    #[arg(long)]
    clip_info_file: PathBuf,

    /// Location to write outputs (must hold the cropped-video artifacts)
    #[arg(long)]
    output_dir: PathBuf,

    /// How many concurrent workers. Defaults to 1 because this pipeline
    /// consumes artifacts produced by clipset-crop; raise it only once
    /// that stage has fully completed.
    #[arg(long, default_value_t = AUDIO_DEFAULT_NUM_WORKERS)]
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
        "starting audio/remux run"
    );

    let processor = Arc::new(ClipProcessor::new(config.clone()));
    let tasks: Vec<_> = specs
        .into_iter()
        .map(|spec| {
            let processor = processor.clone();
            async move {
                let result = processor.process_two_stage(&spec).await;
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
