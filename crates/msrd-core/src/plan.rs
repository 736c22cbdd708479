//! Pre-dispatch planning: codec selection, job source, catalog resolution.
//!
//! Validation runs strictly before the catalog is touched, so an invalid
//! invocation never lists the catalog or schedules anything.

use crate::assets::MediaAssets;
use crate::catalog::Catalog;
use crate::codec::{self, Codec};
use crate::error::PlanError;
use crate::resolver::{self, JobRequest, JobSource, Operation, Resolution};

/// Flags shared by `download` and `convert`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchArgs {
    pub ids: Vec<String>,
    pub all: bool,
    pub force: bool,
    pub mp3: bool,
    pub m4a: bool,
    /// Convert only.
    pub allow_download_fallback: bool,
}

/// A validated batch, ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub operation: Operation,
    pub codec: Codec,
    pub resolution: Resolution,
}

/// Validate `args` and resolve the job list for `operation`.
///
/// Blocking when the catalog has to be listed.
pub fn plan(
    operation: Operation,
    args: BatchArgs,
    catalog: &(impl Catalog + ?Sized),
    assets: &(impl MediaAssets + ?Sized),
) -> Result<Plan, PlanError> {
    let codec = codec::select_codec(args.mp3, args.m4a)?;
    let source = JobSource::from_args(args.ids, args.all)?;
    let request = JobRequest {
        operation,
        codec,
        force: args.force,
        allow_download_fallback: operation == Operation::Convert && args.allow_download_fallback,
    };
    let resolution = resolver::resolve(source, &request, catalog, assets)?;
    tracing::info!(
        ?operation,
        %codec,
        jobs = resolution.jobs.len(),
        skipped = resolution.skipped.len(),
        "batch planned"
    );
    Ok(Plan {
        operation,
        codec,
        resolution,
    })
}
