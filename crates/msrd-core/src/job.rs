//! Jobs and per-job outcomes.

use std::time::Duration;

use crate::codec::Codec;

/// How a job obtains its target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobMode {
    /// Fetch the source and encode it into the target codec.
    Download,
    /// Transcode an already cached source; optionally fetch it when missing.
    Convert { allow_download_fallback: bool },
}

/// One unit of dispatch work. Immutable once built; each job carries its own codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub identifier: String,
    pub mode: JobMode,
    pub codec: Codec,
    pub force: bool,
}

impl Job {
    pub fn download(identifier: impl Into<String>, codec: Codec, force: bool) -> Self {
        Self {
            identifier: identifier.into(),
            mode: JobMode::Download,
            codec,
            force,
        }
    }

    pub fn convert(
        identifier: impl Into<String>,
        codec: Codec,
        force: bool,
        allow_download_fallback: bool,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            mode: JobMode::Convert {
                allow_download_fallback,
            },
            codec,
            force,
        }
    }
}

/// Result of one finished job, produced by the worker that ran it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub identifier: String,
    pub success: bool,
    pub elapsed: Duration,
    /// Failure message when `success` is false.
    pub error: Option<String>,
    /// Convert job recovered by downloading the missing source.
    pub fell_back: bool,
}

impl JobOutcome {
    pub fn succeeded(identifier: impl Into<String>, elapsed: Duration, fell_back: bool) -> Self {
        Self {
            identifier: identifier.into(),
            success: true,
            elapsed,
            error: None,
            fell_back,
        }
    }

    pub fn failed(identifier: impl Into<String>, elapsed: Duration, error: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            success: false,
            elapsed,
            error: Some(error.into()),
            fell_back: false,
        }
    }
}
