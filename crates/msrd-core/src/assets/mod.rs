//! Media asset collaborator: fetches and transcodes audio for one song.
//!
//! The policy and dispatcher only see the [`MediaAssets`] trait. [`MsrAssets`]
//! is the on-disk implementation: raw sources live in the cache dir, encoded
//! songs in the library dir.

mod msr;
mod transcode;

use crate::codec::Codec;
use crate::error::AssetError;

pub use msr::MsrAssets;
pub use transcode::{encoder_args, EncoderSettings, Transcoder};

/// Blocking media operations. Implementations must be safe to call from
/// several worker threads at once without cross-job locking.
pub trait MediaAssets: Send + Sync {
    /// True if the target file for `identifier` in `codec` already exists.
    fn is_present(&self, identifier: &str, codec: Codec) -> bool;

    /// Fetch the song and produce it in `codec`.
    fn fetch(&self, identifier: &str, codec: Codec) -> Result<(), AssetError>;

    /// Encode the already cached source into each of `codecs`.
    ///
    /// Returns [`AssetError::SourceAbsent`] when nothing is cached for `identifier`.
    fn transcode(&self, identifier: &str, codecs: &[Codec]) -> Result<(), AssetError>;
}
