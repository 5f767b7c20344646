//! Bounded, failure-isolated fan-out over a run's clips.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::error::WorkerResult;
use crate::processor::ClipOutcome;

/// Aggregate result of one pool run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub done: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Total wall time for the run
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.done + self.skipped + self.failed
    }

    /// Process exit code for this run. Partial failures exit non-zero so
    /// monitoring can tell them apart from a clean run; skips stay clean.
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 {
            1
        } else {
            0
        }
    }
}

/// Run every task, at most `limit` concurrently.
///
/// Tasks are dispatched in the given order but may complete in any order.
/// Each task's error or panic is recorded in the summary and never aborts
/// the rest; callers log failures with the clip identity at the task
/// boundary before returning them.
pub async fn run_pool<Fut>(tasks: Vec<Fut>, limit: usize) -> RunSummary
where
    Fut: Future<Output = WorkerResult<ClipOutcome>> + Send + 'static,
{
    let start = Instant::now();
    let total = tasks.len();
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));

    let mut set: JoinSet<WorkerResult<ClipOutcome>> = JoinSet::new();
    for task in tasks {
        let semaphore = semaphore.clone();
        set.spawn(async move {
            // The semaphore lives as long as every task and is never
            // closed, so acquisition only ends with a permit.
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("pool semaphore closed");
            task.await
        });
    }

    let mut summary = RunSummary::default();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Ok(ClipOutcome::Done)) => summary.done += 1,
            Ok(Ok(ClipOutcome::Skipped)) => summary.skipped += 1,
            // Already logged with the clip identity at the task boundary.
            Ok(Err(_)) => summary.failed += 1,
            Err(join_err) => {
                error!(error = %join_err, "worker task panicked");
                summary.failed += 1;
            }
        }
    }
    summary.elapsed = start.elapsed();

    info!(
        total,
        done = summary.done,
        skipped = summary.skipped,
        failed = summary.failed,
        elapsed_secs = summary.elapsed.as_secs_f64(),
        "run complete"
    );
    summary
}
