//! Job source resolution: explicit identifiers or the whole catalog.
//!
//! Explicit identifiers are used verbatim and never deduplicated. Catalog
//! entries are ordered per operation and run through the dedup filter.

use crate::assets::MediaAssets;
use crate::catalog::{Catalog, CatalogEntry};
use crate::codec::Codec;
use crate::dedup::{self, Admission};
use crate::error::{CatalogError, RunError};
use crate::job::Job;

/// Where the identifiers of a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSource {
    Explicit(Vec<String>),
    Catalog,
}

impl JobSource {
    /// Explicit ids win over `all`; neither is `NoJobsSpecified`.
    pub fn from_args(ids: Vec<String>, all: bool) -> Result<Self, RunError> {
        if !ids.is_empty() {
            Ok(JobSource::Explicit(ids))
        } else if all {
            Ok(JobSource::Catalog)
        } else {
            Err(RunError::NoJobsSpecified)
        }
    }
}

/// The two batch operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Download,
    Convert,
}

/// Order in which an operation walks the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrder {
    Natural,
    Reversed,
}

impl Operation {
    /// Download walks newest first; convert keeps the listing order.
    pub fn catalog_order(self) -> CatalogOrder {
        match self {
            Operation::Download => CatalogOrder::Reversed,
            Operation::Convert => CatalogOrder::Natural,
        }
    }

    /// Past participle used in skip notes.
    pub fn done_verb(self) -> &'static str {
        match self {
            Operation::Download => "downloaded",
            Operation::Convert => "converted",
        }
    }

    /// Noun used in the summary line.
    pub fn noun(self) -> &'static str {
        match self {
            Operation::Download => "Download",
            Operation::Convert => "Conversion",
        }
    }
}

/// Everything needed to build a job besides its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobRequest {
    pub operation: Operation,
    pub codec: Codec,
    pub force: bool,
    /// Only meaningful for [`Operation::Convert`].
    pub allow_download_fallback: bool,
}

impl JobRequest {
    pub fn job(&self, identifier: impl Into<String>) -> Job {
        match self.operation {
            Operation::Download => Job::download(identifier, self.codec, self.force),
            Operation::Convert => Job::convert(
                identifier,
                self.codec,
                self.force,
                self.allow_download_fallback,
            ),
        }
    }
}

/// Jobs to dispatch plus the catalog entries skipped on the way, both in resolution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub jobs: Vec<Job>,
    /// Skipped identifiers; `None` for entries without one.
    pub skipped: Vec<Option<String>>,
}

/// Catalog entries in the order `operation` consumes them.
pub fn order_entries(mut entries: Vec<CatalogEntry>, order: CatalogOrder) -> Vec<CatalogEntry> {
    if order == CatalogOrder::Reversed {
        entries.reverse();
    }
    entries
}

/// Build the job list. The catalog is only listed for [`JobSource::Catalog`].
pub fn resolve(
    source: JobSource,
    request: &JobRequest,
    catalog: &(impl Catalog + ?Sized),
    assets: &(impl MediaAssets + ?Sized),
) -> Result<Resolution, CatalogError> {
    match source {
        JobSource::Explicit(ids) => Ok(Resolution {
            jobs: ids.into_iter().map(|id| request.job(id)).collect(),
            skipped: Vec::new(),
        }),
        JobSource::Catalog => {
            let entries = order_entries(catalog.list()?, request.operation.catalog_order());
            let mut resolution = Resolution::default();
            for entry in entries {
                match dedup::admit(entry.cid.as_deref(), request.codec, request.force, assets) {
                    Admission::Admit(cid) => resolution.jobs.push(request.job(cid)),
                    Admission::Skip(cid) => {
                        tracing::info!(
                            cid = cid.as_deref().unwrap_or("-"),
                            codec = %request.codec,
                            "skipping, already {}",
                            request.operation.done_verb()
                        );
                        resolution.skipped.push(cid);
                    }
                }
            }
            Ok(resolution)
        }
    }
}
