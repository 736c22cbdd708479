//! Output codec and the codec selector.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RunError;

/// Target audio codec. Exactly one is active per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    #[default]
    Flac,
    M4a,
    Mp3,
}

impl Codec {
    /// File extension used for library files.
    pub fn extension(self) -> &'static str {
        match self {
            Codec::Flac => "flac",
            Codec::M4a => "m4a",
            Codec::Mp3 => "mp3",
        }
    }

    /// ffmpeg muxer name (`-f`), needed because outputs are written to `.part` paths.
    pub fn muxer(self) -> &'static str {
        match self {
            Codec::Flac => "flac",
            Codec::M4a => "ipod",
            Codec::Mp3 => "mp3",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Resolve the codec from the two mutually exclusive override flags.
///
/// Must run before any job source is resolved.
pub fn select_codec(mp3: bool, m4a: bool) -> Result<Codec, RunError> {
    match (mp3, m4a) {
        (true, true) => Err(RunError::ConflictingCodecs),
        (true, false) => Ok(Codec::Mp3),
        (false, true) => Ok(Codec::M4a),
        (false, false) => Ok(Codec::Flac),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_flac() {
        assert_eq!(select_codec(false, false), Ok(Codec::Flac));
        assert_eq!(Codec::default(), Codec::Flac);
    }

    #[test]
    fn single_override_wins() {
        assert_eq!(select_codec(true, false), Ok(Codec::Mp3));
        assert_eq!(select_codec(false, true), Ok(Codec::M4a));
    }

    #[test]
    fn both_overrides_conflict() {
        assert_eq!(select_codec(true, true), Err(RunError::ConflictingCodecs));
    }

    #[test]
    fn display_uses_extension() {
        assert_eq!(Codec::M4a.to_string(), "m4a");
        assert_eq!(Codec::Mp3.muxer(), "mp3");
        assert_eq!(Codec::M4a.muxer(), "ipod");
    }
}
