//! Per-job execution: download, or convert with optional download fallback.

use crate::assets::MediaAssets;
use crate::error::AssetError;
use crate::job::{Job, JobMode};

/// What a successful job actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    Downloaded,
    Converted,
    /// Convert found no cached source and downloaded instead.
    DownloadedAfterFallback,
}

/// Run one job against the media asset collaborator.
///
/// Only [`AssetError::SourceAbsent`] in convert mode can trigger the fallback,
/// and only when the job allows it.
pub fn execute(assets: &(impl MediaAssets + ?Sized), job: &Job) -> Result<Execution, AssetError> {
    match job.mode {
        JobMode::Download => {
            assets.fetch(&job.identifier, job.codec)?;
            Ok(Execution::Downloaded)
        }
        JobMode::Convert {
            allow_download_fallback,
        } => match assets.transcode(&job.identifier, &[job.codec]) {
            Ok(()) => Ok(Execution::Converted),
            Err(AssetError::SourceAbsent { .. }) if allow_download_fallback => {
                tracing::debug!(cid = %job.identifier, "source not cached, downloading");
                assets.fetch(&job.identifier, job.codec)?;
                Ok(Execution::DownloadedAfterFallback)
            }
            Err(e) => Err(e),
        },
    }
}
