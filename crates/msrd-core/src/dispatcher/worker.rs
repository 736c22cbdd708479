//! One worker slot: run a job on the blocking pool and turn whatever
//! happens into a [`JobOutcome`].

use std::sync::Arc;
use std::time::Instant;

use crate::assets::MediaAssets;
use crate::job::{Job, JobOutcome};
use crate::policy::{self, Execution};

/// Runs `job` to completion. Errors and panics in the collaborator become a
/// failed outcome; nothing escapes to the caller.
pub async fn run_one(job: Job, assets: Arc<dyn MediaAssets>) -> JobOutcome {
    let started = Instant::now();
    let identifier = job.identifier.clone();
    tracing::debug!(cid = %identifier, mode = ?job.mode, codec = %job.codec, "job started");

    let result = tokio::task::spawn_blocking(move || policy::execute(assets.as_ref(), &job)).await;
    let elapsed = started.elapsed();

    match result {
        Ok(Ok(execution)) => {
            tracing::info!(cid = %identifier, ?execution, elapsed_ms = elapsed.as_millis() as u64, "job finished");
            JobOutcome::succeeded(
                identifier,
                elapsed,
                execution == Execution::DownloadedAfterFallback,
            )
        }
        Ok(Err(e)) => {
            tracing::warn!(cid = %identifier, "job failed: {}", e);
            JobOutcome::failed(identifier, elapsed, e.to_string())
        }
        Err(join_err) => {
            let message = if join_err.is_panic() {
                "worker panicked".to_string()
            } else {
                format!("worker cancelled: {}", join_err)
            };
            tracing::error!(cid = %identifier, "{}", message);
            JobOutcome::failed(identifier, elapsed, message)
        }
    }
}
