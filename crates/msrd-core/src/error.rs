//! Typed errors for the orchestration core and its collaborators.

use thiserror::Error;

/// Pre-dispatch validation failures. Both abort the run before any job is scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// `--mp3` and `--m4a` were both given.
    #[error("Cannot use both --mp3 and --m4a flags together")]
    ConflictingCodecs,
    /// Neither identifiers nor `--all` were given.
    #[error("no songs specified")]
    NoJobsSpecified,
}

/// Failure reported by the media asset collaborator for a single job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    /// Convert mode found no cached source to transcode from.
    #[error("[{identifier}] source asset is not cached")]
    SourceAbsent { identifier: String },
    /// Any other fetch or transcode failure.
    #[error("[{identifier}] {message}")]
    Collaborator { identifier: String, message: String },
}

impl AssetError {
    pub fn source_absent(identifier: &str) -> Self {
        AssetError::SourceAbsent {
            identifier: identifier.to_string(),
        }
    }

    /// Wrap an arbitrary error; uses the alternate format so anyhow context chains survive.
    pub fn collaborator(identifier: &str, err: impl std::fmt::Display) -> Self {
        AssetError::Collaborator {
            identifier: identifier.to_string(),
            message: format!("{:#}", err),
        }
    }

    pub fn is_source_absent(&self) -> bool {
        matches!(self, AssetError::SourceAbsent { .. })
    }
}

/// Catalog listing (or song detail lookup) failed.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request failed: {0}")]
    Curl(#[from] curl::Error),
    #[error("HTTP {0}")]
    Http(u32),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("API error {code}: {msg}")]
    Api { code: i64, msg: String },
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Anything that stops a batch before dispatch.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("catalog listing failed: {0}")]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicting_codecs_message_names_both_flags() {
        let msg = RunError::ConflictingCodecs.to_string();
        assert!(msg.contains("--mp3") && msg.contains("--m4a"));
    }

    #[test]
    fn collaborator_keeps_context_chain() {
        let err = anyhow::anyhow!("HTTP 404").context("fetching source");
        let e = AssetError::collaborator("514", err);
        assert_eq!(e.to_string(), "[514] fetching source: HTTP 404");
        assert!(!e.is_source_absent());
        assert!(AssetError::source_absent("514").is_source_absent());
    }
}
