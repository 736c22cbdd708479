//! ffmpeg invocation for audio transcodes.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::codec::Codec;
use crate::config::MsrdConfig;
use crate::storage::PartFile;

/// Encoder knobs taken from config.
#[derive(Debug, Clone)]
pub struct EncoderSettings {
    pub mp3_quality: u8,
    pub m4a_bitrate: String,
}

impl From<&MsrdConfig> for EncoderSettings {
    fn from(cfg: &MsrdConfig) -> Self {
        Self {
            mp3_quality: cfg.mp3_quality.min(9),
            m4a_bitrate: cfg.m4a_bitrate.clone(),
        }
    }
}

/// Audio encoder arguments for `codec` (everything between input and output).
pub fn encoder_args(codec: Codec, settings: &EncoderSettings) -> Vec<String> {
    let mut args: Vec<String> = ["-vn", "-map_metadata", "0"].map(String::from).to_vec();
    match codec {
        Codec::Flac => {
            args.extend(["-c:a", "flac", "-compression_level", "8"].map(String::from));
        }
        Codec::M4a => {
            args.extend(["-c:a", "aac", "-b:a"].map(String::from));
            args.push(settings.m4a_bitrate.clone());
        }
        Codec::Mp3 => {
            args.extend(["-c:a", "libmp3lame", "-q:a"].map(String::from));
            args.push(settings.mp3_quality.to_string());
        }
    }
    args.extend(["-f", codec.muxer()].map(String::from));
    args
}

/// Runs ffmpeg to encode one file. Blocking.
#[derive(Debug, Clone)]
pub struct Transcoder {
    ffmpeg: PathBuf,
    settings: EncoderSettings,
}

impl Transcoder {
    pub fn new(cfg: &MsrdConfig) -> Self {
        Self {
            ffmpeg: PathBuf::from(&cfg.ffmpeg),
            settings: EncoderSettings::from(cfg),
        }
    }

    /// Encode `source` into `dest` (via `dest.part`), replacing any existing file.
    pub fn encode(&self, source: &Path, dest: &Path, codec: Codec) -> Result<()> {
        let mut part = PartFile::create(dest)?;
        part.close();

        let output = Command::new(&self.ffmpeg)
            .args(["-hide_banner", "-loglevel", "error", "-nostdin", "-y", "-i"])
            .arg(source)
            .args(encoder_args(codec, &self.settings))
            .arg(part.temp_path())
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to run {}", self.ffmpeg.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "ffmpeg exited with {} encoding {} to {}: {}",
                output.status,
                source.display(),
                codec,
                stderr.trim()
            );
        }

        part.finalize()?;
        tracing::debug!(source = %source.display(), dest = %dest.display(), "transcoded");
        Ok(())
    }
}
