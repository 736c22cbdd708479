//! On-disk media assets backed by the song API and ffmpeg.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache;
use crate::catalog::HttpCatalog;
use crate::codec::Codec;
use crate::config::MsrdConfig;
use crate::error::AssetError;
use crate::http::{self, HttpOptions};
use crate::storage::PartFile;

use super::transcode::Transcoder;
use super::MediaAssets;

/// Extension assumed when the source URL has none.
const DEFAULT_SOURCE_EXT: &str = "wav";

/// Sources are cached as `<cache_dir>/<cid>.<ext>`; encoded songs land in
/// `<library_dir>/<cid>.<codec>`.
#[derive(Debug, Clone)]
pub struct MsrAssets {
    api: HttpCatalog,
    transcoder: Transcoder,
    cache_dir: PathBuf,
    library_dir: PathBuf,
    http: HttpOptions,
}

impl MsrAssets {
    pub fn new(cfg: &MsrdConfig) -> Result<Self> {
        let cache_dir = cfg.cache_dir()?;
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("failed to create cache dir {}", cache_dir.display()))?;
        std::fs::create_dir_all(&cfg.library_dir).with_context(|| {
            format!("failed to create library dir {}", cfg.library_dir.display())
        })?;
        Ok(Self {
            api: HttpCatalog::new(cfg)?,
            transcoder: Transcoder::new(cfg),
            cache_dir,
            library_dir: cfg.library_dir.clone(),
            http: HttpOptions {
                connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
                transfer_timeout: Duration::from_secs(cfg.transfer_timeout_secs),
            },
        })
    }

    /// Library path of `identifier` encoded as `codec`.
    pub fn library_path(&self, identifier: &str, codec: Codec) -> PathBuf {
        self.library_dir
            .join(format!("{}.{}", identifier, codec.extension()))
    }

    /// Cached source for `identifier`, if any.
    pub fn cached_source(&self, identifier: &str) -> Result<Option<PathBuf>> {
        Ok(cache::find_entry(&self.cache_dir, identifier)?.map(|e| e.path))
    }

    fn download_source(&self, identifier: &str) -> Result<PathBuf> {
        let detail = self
            .api
            .song_detail(identifier)
            .context("song detail lookup failed")?;
        let ext = source_extension(&detail.source_url);
        let dest = self.cache_dir.join(format!("{}.{}", identifier, ext));

        tracing::debug!(cid = identifier, url = %detail.source_url, "fetching source");
        let mut part = PartFile::create(&dest)?;
        let bytes = http::download_to(&detail.source_url, &mut part, self.http)?;
        let path = part.finalize()?;
        tracing::info!(cid = identifier, bytes, path = %path.display(), "source cached");
        Ok(path)
    }

    fn encode(&self, identifier: &str, source: &Path, codec: Codec) -> Result<()> {
        let dest = self.library_path(identifier, codec);
        let same_format = source
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case(codec.extension()));
        if same_format {
            // Already in the target format: copy instead of re-encoding.
            let mut part = PartFile::create(&dest)?;
            let mut src = File::open(source)
                .with_context(|| format!("failed to open {}", source.display()))?;
            std::io::copy(&mut src, &mut part).context("copying source into library")?;
            part.finalize()?;
            return Ok(());
        }
        self.transcoder.encode(source, &dest, codec)
    }
}

impl MediaAssets for MsrAssets {
    fn is_present(&self, identifier: &str, codec: Codec) -> bool {
        self.library_path(identifier, codec).is_file()
    }

    fn fetch(&self, identifier: &str, codec: Codec) -> Result<(), AssetError> {
        let source = self
            .download_source(identifier)
            .map_err(|e| AssetError::collaborator(identifier, e))?;
        self.encode(identifier, &source, codec)
            .map_err(|e| AssetError::collaborator(identifier, e))
    }

    fn transcode(&self, identifier: &str, codecs: &[Codec]) -> Result<(), AssetError> {
        let source = self
            .cached_source(identifier)
            .map_err(|e| AssetError::collaborator(identifier, e))?
            .ok_or_else(|| AssetError::source_absent(identifier))?;
        for &codec in codecs {
            self.encode(identifier, &source, codec)
                .map_err(|e| AssetError::collaborator(identifier, e))?;
        }
        Ok(())
    }
}

/// File extension of the source URL's last path segment, lowercased.
fn source_extension(source_url: &str) -> String {
    url::Url::parse(source_url)
        .ok()
        .and_then(|u| {
            let segment = u.path_segments()?.next_back()?.to_string();
            Path::new(&segment)
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_ascii_lowercase())
        })
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_SOURCE_EXT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets_in(dir: &Path) -> MsrAssets {
        let mut cfg = MsrdConfig::default();
        cfg.cache_dir = Some(dir.join("cache"));
        cfg.library_dir = dir.join("library");
        cfg.ffmpeg = dir.join("no-such-ffmpeg").display().to_string();
        MsrAssets::new(&cfg).unwrap()
    }

    #[test]
    fn source_extension_from_url() {
        assert_eq!(source_extension("https://cdn.example.com/a/514.wav"), "wav");
        assert_eq!(source_extension("https://cdn.example.com/a/514.MP3?sig=1"), "mp3");
        assert_eq!(source_extension("https://cdn.example.com/a/514"), "wav");
        assert_eq!(source_extension("not a url"), "wav");
    }

    #[test]
    fn presence_follows_library_files() {
        let dir = tempfile::tempdir().unwrap();
        let assets = assets_in(dir.path());
        assert!(!assets.is_present("514", Codec::Flac));
        std::fs::write(assets.library_path("514", Codec::Flac), b"fLaC").unwrap();
        assert!(assets.is_present("514", Codec::Flac));
        assert!(!assets.is_present("514", Codec::Mp3));
    }

    #[test]
    fn transcode_without_cached_source_is_source_absent() {
        let dir = tempfile::tempdir().unwrap();
        let assets = assets_in(dir.path());
        let err = assets.transcode("880", &[Codec::Flac]).unwrap_err();
        assert_eq!(err, AssetError::source_absent("880"));
    }

    #[test]
    fn transcode_same_format_copies_source() {
        let dir = tempfile::tempdir().unwrap();
        let assets = assets_in(dir.path());
        std::fs::write(assets.cache_dir.join("880.mp3"), b"ID3 data").unwrap();

        assets.transcode("880", &[Codec::Mp3]).unwrap();
        assert!(assets.is_present("880", Codec::Mp3));
        assert_eq!(
            std::fs::read(assets.library_path("880", Codec::Mp3)).unwrap(),
            b"ID3 data"
        );
    }

    #[test]
    fn transcode_failure_is_collaborator_error() {
        let dir = tempfile::tempdir().unwrap();
        let assets = assets_in(dir.path());
        std::fs::write(assets.cache_dir.join("880.wav"), b"RIFF").unwrap();

        let err = assets.transcode("880", &[Codec::Flac]).unwrap_err();
        assert!(!err.is_source_absent());
        assert!(!assets.is_present("880", Codec::Flac));
    }
}
