//! `msrd download` / `msrd convert` – plan, dispatch, and report a batch.

use anyhow::{Context, Result};
use msrd_core::assets::MsrAssets;
use msrd_core::catalog::HttpCatalog;
use msrd_core::codec;
use msrd_core::config::MsrdConfig;
use msrd_core::dispatcher;
use msrd_core::error::{PlanError, RunError};
use msrd_core::job::JobOutcome;
use msrd_core::plan::{self, BatchArgs};
use msrd_core::resolver::{JobSource, Operation};
use std::process::ExitCode;
use std::sync::Arc;

use crate::cli::progress;

fn verb(operation: Operation) -> &'static str {
    match operation {
        Operation::Download => "download",
        Operation::Convert => "convert",
    }
}

fn no_jobs(operation: Operation) -> ExitCode {
    eprintln!("Please specify the song(s) you want to {}.", verb(operation));
    ExitCode::FAILURE
}

pub async fn run_batch(
    cfg: &MsrdConfig,
    operation: Operation,
    args: BatchArgs,
    threads: Option<usize>,
) -> Result<ExitCode> {
    // Fail fast on the codec flags and an empty job source before touching disk or network.
    codec::select_codec(args.mp3, args.m4a)?;
    if let Err(RunError::NoJobsSpecified) = JobSource::from_args(args.ids.clone(), args.all) {
        return Ok(no_jobs(operation));
    }

    let catalog = Arc::new(HttpCatalog::new(cfg)?);
    let assets = Arc::new(MsrAssets::new(cfg)?);

    let planned = tokio::task::spawn_blocking({
        let catalog = Arc::clone(&catalog);
        let assets = Arc::clone(&assets);
        move || plan::plan(operation, args, catalog.as_ref(), assets.as_ref())
    })
    .await
    .context("planning task")?;

    let plan = match planned {
        Ok(plan) => plan,
        Err(PlanError::Run(RunError::NoJobsSpecified)) => return Ok(no_jobs(operation)),
        Err(e) => return Err(e.into()),
    };

    for cid in &plan.resolution.skipped {
        println!(
            "INFO: skipping [{}], already {}",
            cid.as_deref().unwrap_or("None"),
            operation.done_verb()
        );
    }

    let jobs = plan.resolution.jobs;
    let total = jobs.len();
    let workers = cfg.worker_count(threads);
    tracing::info!(jobs = total, workers, codec = %plan.codec, "starting {}", verb(operation));

    let (progress_tx, progress_rx) = tokio::sync::mpsc::channel::<JobOutcome>(total.max(1));
    let reporter = progress::spawn_reporter(total, progress_rx);

    dispatcher::run_jobs(jobs, assets, workers, Some(progress_tx)).await;

    let summary = reporter.await.context("progress reporter")?;
    println!("{}", summary.message(operation));

    if summary.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!(failed = summary.failed, "batch finished with failures");
        Ok(ExitCode::FAILURE)
    }
}
