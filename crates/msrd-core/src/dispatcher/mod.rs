//! Bounded concurrent job dispatch.
//!
//! Keeps up to `workers` jobs in flight; when one finishes, the next job is
//! started until the list is exhausted. Every job yields exactly one
//! [`JobOutcome`], whether it succeeded, failed, or panicked.

mod worker;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::Id;

use crate::assets::MediaAssets;
use crate::job::{Job, JobOutcome};

pub use worker::run_one;

/// Runs `jobs` with at most `workers` in flight (at least one).
///
/// Each outcome is sent on `progress_tx` as its job completes and all
/// outcomes are returned, in completion order. A closed progress channel
/// does not stop the run.
pub async fn run_jobs(
    jobs: Vec<Job>,
    assets: Arc<dyn MediaAssets>,
    workers: usize,
    progress_tx: Option<mpsc::Sender<JobOutcome>>,
) -> Vec<JobOutcome> {
    dispatch(jobs, workers, progress_tx, move |job| run_one(job, Arc::clone(&assets))).await
}

/// The refill loop behind [`run_jobs`], generic over the per-job task.
async fn dispatch<F, Fut>(
    jobs: Vec<Job>,
    workers: usize,
    progress_tx: Option<mpsc::Sender<JobOutcome>>,
    run: F,
) -> Vec<JobOutcome>
where
    F: Fn(Job) -> Fut,
    Fut: Future<Output = JobOutcome> + Send + 'static,
{
    let workers = workers.max(1);
    let total = jobs.len();
    let mut pending = jobs.into_iter();
    let mut outcomes = Vec::with_capacity(total);
    let mut join_set = tokio::task::JoinSet::new();
    // Task id → (identifier, start), so a lost task still yields an outcome.
    let mut running: HashMap<Id, (String, Instant)> = HashMap::new();

    tracing::debug!(jobs = total, workers, "dispatching");

    loop {
        while join_set.len() < workers {
            let Some(job) = pending.next() else {
                break;
            };
            let identifier = job.identifier.clone();
            let handle = join_set.spawn(run(job));
            running.insert(handle.id(), (identifier, Instant::now()));
        }

        let Some(res) = join_set.join_next_with_id().await else {
            break;
        };
        let outcome = match res {
            Ok((id, outcome)) => {
                running.remove(&id);
                outcome
            }
            Err(e) => {
                let (identifier, started) = running
                    .remove(&e.id())
                    .unwrap_or_else(|| ("?".to_string(), Instant::now()));
                tracing::error!(cid = %identifier, "job task join: {}", e);
                let message = if e.is_panic() {
                    "worker panicked".to_string()
                } else {
                    format!("worker cancelled: {}", e)
                };
                JobOutcome::failed(identifier, started.elapsed(), message)
            }
        };
        if let Some(tx) = &progress_tx {
            if tx.send(outcome.clone()).await.is_err() {
                tracing::debug!("progress receiver dropped");
            }
        }
        outcomes.push(outcome);
    }

    if outcomes.len() != total {
        tracing::warn!(dispatched = total, completed = outcomes.len(), "outcome count mismatch");
    }
    outcomes
}
