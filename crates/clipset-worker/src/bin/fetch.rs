//! Source-fetch stage binary.
//!
//! Downloads a slice of the id list as merged `{id}_full.mp4` files. This
//! is the external collaborator the crop pipelines read from; its only
//! contract with them is the fetched file name.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use clipset_media::{fetch_source, FetchOutcome};
use clipset_worker::{logging, run_pool, ClipOutcome, WorkerError, DEFAULT_NUM_WORKERS};

/// Fetch source recordings listed in an id file.
#[derive(Parser, Debug)]
#[command(name = "clipset-fetch", version, about)]
struct Args {
    /// File listing source ids, one per line
    #[arg(long)]
    input_list: PathBuf,

    /// Location to download sources into
    #[arg(long, default_value = "data/source_videos")]
    output_dir: PathBuf,

    /// Start offset into the id list
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// End offset into the id list (exclusive; defaults to the whole list)
    #[arg(long)]
    end: Option<usize>,

    /// How many concurrent workers
    #[arg(long, default_value_t = DEFAULT_NUM_WORKERS)]
    num_workers: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let args = Args::parse();

    let ids: Vec<String> = std::fs::read_to_string(&args.input_list)
        .with_context(|| format!("reading id list {}", args.input_list.display()))?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    let end = args.end.unwrap_or(ids.len()).min(ids.len());
    let start = args.start.min(end);
    let slice = ids[start..end].to_vec();

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating output directory {}", args.output_dir.display()))?;
    info!(
        ids = slice.len(),
        start,
        end,
        workers = args.num_workers,
        "starting fetch run"
    );

    let output_dir = Arc::new(args.output_dir);
    let tasks: Vec<_> = slice
        .into_iter()
        .map(|id| {
            let output_dir = output_dir.clone();
            async move {
                match fetch_source(&id, &output_dir).await {
                    Ok(FetchOutcome::Fetched) => Ok(ClipOutcome::Done),
                    Ok(FetchOutcome::AlreadyExists) => Ok(ClipOutcome::Skipped),
                    Err(e) => {
                        error!(source_id = %id, error = %e, "fetch failed");
                        Err(WorkerError::Fetch(e))
                    }
                }
            }
        })
        .collect();

    let summary = run_pool(tasks, args.num_workers).await;
    if summary.failed > 0 {
        std::process::exit(summary.exit_code());
    }
    Ok(())
}
