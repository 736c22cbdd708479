//! Integration tests: planning and dispatching batches against fake collaborators.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use common::fakes::{FakeAssets, FakeCatalog};
use msrd_core::catalog::CatalogEntry;
use msrd_core::codec::Codec;
use msrd_core::dispatcher;
use msrd_core::error::{PlanError, RunError};
use msrd_core::job::{Job, JobOutcome};
use msrd_core::plan::{self, BatchArgs};
use msrd_core::report::Tally;
use msrd_core::resolver::Operation;

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn job_ids(jobs: &[Job]) -> Vec<&str> {
    jobs.iter().map(|j| j.identifier.as_str()).collect()
}

#[tokio::test]
async fn every_job_yields_one_outcome_despite_failures() {
    let assets = Arc::new(FakeAssets::new().failing("b").panicking("d"));
    let jobs: Vec<Job> = ["a", "b", "c", "d", "e"]
        .into_iter()
        .map(|id| Job::download(id, Codec::Flac, false))
        .collect();

    let outcomes = dispatcher::run_jobs(jobs, assets.clone(), 2, None).await;

    assert_eq!(outcomes.len(), 5);
    let seen: HashSet<_> = outcomes.iter().map(|o| o.identifier.as_str()).collect();
    assert_eq!(seen, HashSet::from(["a", "b", "c", "d", "e"]));
    let failed: HashSet<_> = outcomes
        .iter()
        .filter(|o| !o.success)
        .map(|o| o.identifier.as_str())
        .collect();
    assert_eq!(failed, HashSet::from(["b", "d"]));
    assert!(outcomes.iter().filter(|o| !o.success).all(|o| o.error.is_some()));
}

#[tokio::test]
async fn zero_jobs_complete_immediately() {
    let assets = Arc::new(FakeAssets::new());
    let (tx, mut rx) = tokio::sync::mpsc::channel::<JobOutcome>(4);
    let outcomes = dispatcher::run_jobs(Vec::new(), assets.clone(), 4, Some(tx)).await;
    assert!(outcomes.is_empty());
    assert!(rx.recv().await.is_none(), "sender dropped without events");
    assert!(assets.calls().is_empty());
}

#[test]
fn conflicting_codecs_fail_before_catalog_listing() {
    let catalog = FakeCatalog::new(&["1", "2"]);
    let assets = FakeAssets::new();
    let args = BatchArgs {
        all: true,
        mp3: true,
        m4a: true,
        ..BatchArgs::default()
    };
    let err = plan::plan(Operation::Download, args, &catalog, &assets).unwrap_err();
    assert!(matches!(err, PlanError::Run(RunError::ConflictingCodecs)));
    assert_eq!(catalog.calls(), 0);
}

#[test]
fn no_ids_and_no_all_is_rejected() {
    let catalog = FakeCatalog::new(&["1"]);
    let assets = FakeAssets::new();
    let err = plan::plan(Operation::Convert, BatchArgs::default(), &catalog, &assets).unwrap_err();
    assert!(matches!(err, PlanError::Run(RunError::NoJobsSpecified)));
    assert_eq!(catalog.calls(), 0);
    assert!(assets.calls().is_empty());
}

#[test]
fn catalog_mode_skips_satisfied_but_explicit_ids_always_run() {
    let catalog = FakeCatalog::new(&["1", "2", "3"]);
    let assets = FakeAssets::new().present("2", Codec::Flac);

    let all = BatchArgs {
        all: true,
        ..BatchArgs::default()
    };
    let plan = plan::plan(Operation::Download, all, &catalog, &assets).unwrap();
    assert_eq!(job_ids(&plan.resolution.jobs), ["3", "1"]);
    assert_eq!(plan.resolution.skipped, [Some("2".to_string())]);

    let explicit = BatchArgs {
        ids: ids(&["2"]),
        ..BatchArgs::default()
    };
    let plan = plan::plan(Operation::Download, explicit, &catalog, &assets).unwrap();
    assert_eq!(job_ids(&plan.resolution.jobs), ["2"]);
    assert!(plan.resolution.skipped.is_empty());
    // Explicit ids never list the catalog.
    assert_eq!(catalog.calls(), 1);
}

#[test]
fn force_bypasses_dedup_in_catalog_mode() {
    let catalog = FakeCatalog::new(&["1", "2"]);
    let assets = FakeAssets::new().present("1", Codec::Mp3).present("2", Codec::Mp3);
    let args = BatchArgs {
        all: true,
        force: true,
        mp3: true,
        ..BatchArgs::default()
    };
    let plan = plan::plan(Operation::Convert, args, &catalog, &assets).unwrap();
    assert_eq!(plan.codec, Codec::Mp3);
    assert_eq!(job_ids(&plan.resolution.jobs), ["1", "2"]);
    assert!(plan.resolution.jobs.iter().all(|j| j.force && j.codec == Codec::Mp3));
}

#[test]
fn convert_walks_catalog_in_natural_order_and_skips_missing_cids() {
    let catalog = FakeCatalog::with_entries(vec![
        CatalogEntry::with_cid("10"),
        CatalogEntry::default(),
        CatalogEntry::with_cid("20"),
    ]);
    let assets = FakeAssets::new();
    let args = BatchArgs {
        all: true,
        ..BatchArgs::default()
    };
    let plan = plan::plan(Operation::Convert, args, &catalog, &assets).unwrap();
    assert_eq!(job_ids(&plan.resolution.jobs), ["10", "20"]);
    assert_eq!(plan.resolution.skipped, [None::<String>]);
}

#[tokio::test]
async fn convert_fallback_downloads_only_when_allowed() {
    let assets = Arc::new(FakeAssets::new());
    let jobs = vec![Job::convert("x", Codec::Flac, false, true)];
    let outcomes = dispatcher::run_jobs(jobs, assets.clone(), 1, None).await;
    assert!(outcomes[0].success);
    assert!(outcomes[0].fell_back);
    assert_eq!(assets.calls(), ["transcode x flac", "fetch x flac"]);

    let assets = Arc::new(FakeAssets::new());
    let jobs = vec![Job::convert("y", Codec::Flac, false, false)];
    let outcomes = dispatcher::run_jobs(jobs, assets.clone(), 1, None).await;
    assert!(!outcomes[0].success);
    assert!(!outcomes[0].fell_back);
    assert_eq!(assets.calls(), ["transcode y flac"]);
}

#[tokio::test]
async fn in_flight_jobs_never_exceed_thread_count() {
    for threads in [1usize, 3] {
        let assets = Arc::new(FakeAssets::new().with_work(Duration::from_millis(25)));
        let jobs: Vec<Job> = (0..8)
            .map(|i| Job::download(i.to_string(), Codec::Flac, false))
            .collect();
        let outcomes = dispatcher::run_jobs(jobs, assets.clone(), threads, None).await;
        assert_eq!(outcomes.len(), 8);
        assert!(
            assets.peak() <= threads,
            "peak {} exceeded {threads} workers",
            assets.peak()
        );
        assert!(assets.peak() >= 1);
    }
}

#[tokio::test]
async fn end_to_end_two_explicit_downloads() {
    let catalog = FakeCatalog::new(&[]);
    let assets = Arc::new(FakeAssets::new().with_work(Duration::from_millis(5)));
    let args = BatchArgs {
        ids: ids(&["A", "B"]),
        ..BatchArgs::default()
    };
    let plan = plan::plan(Operation::Download, args, &catalog, assets.as_ref()).unwrap();
    assert_eq!(plan.codec, Codec::Flac);

    let total = plan.resolution.jobs.len();
    let (tx, mut rx) = tokio::sync::mpsc::channel::<JobOutcome>(total.max(1));
    let reporter = tokio::spawn(async move {
        let mut tally = Tally::new(total);
        while let Some(outcome) = rx.recv().await {
            tally.observe(&outcome);
        }
        (tally.is_clean(), tally.summary())
    });

    dispatcher::run_jobs(plan.resolution.jobs, assets.clone(), 2, Some(tx)).await;
    let (clean, summary) = reporter.await.unwrap();

    assert!(clean);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.succeeded, 2);
    assert!(summary.elapsed > Duration::ZERO);
    let message = summary.message(Operation::Download);
    assert!(message.contains("2 songs"), "{message}");

    let mut calls = assets.calls();
    calls.sort();
    assert_eq!(calls, ["fetch A flac", "fetch B flac"]);
}

#[test]
fn explicit_ids_keep_caller_order() {
    let catalog = FakeCatalog::new(&["1", "2", "3"]);
    let assets = FakeAssets::new().present("1", Codec::Flac);
    let args = BatchArgs {
        ids: ids(&["3", "1", "2"]),
        ..BatchArgs::default()
    };
    let plan = plan::plan(Operation::Download, args, &catalog, &assets).unwrap();
    assert_eq!(job_ids(&plan.resolution.jobs), ["3", "1", "2"]);
    assert!(plan.resolution.skipped.is_empty());
    assert_eq!(catalog.calls(), 0);
}
