use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default base URL of the Monster Siren Records API.
pub const DEFAULT_API_BASE: &str = "https://monster-siren.hypergryph.com/api";

/// Global configuration loaded from `~/.config/msrd/config.toml`.
///
/// Built once at startup and handed to the catalog and media asset
/// constructors; nothing else reads configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsrdConfig {
    /// Base URL of the song API (no trailing `/songs`).
    pub api_base: String,
    /// Directory that receives transcoded songs (`<cid>.<codec>`).
    pub library_dir: PathBuf,
    /// Directory holding raw source downloads. Defaults to the XDG cache dir.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Worker count used when `--threads` is not given. None = derived from CPU count.
    #[serde(default)]
    pub default_threads: Option<usize>,
    /// ffmpeg binary used for transcoding.
    pub ffmpeg: String,
    /// Connect timeout for API and source requests, in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-transfer timeout for a single source download, in seconds.
    pub transfer_timeout_secs: u64,
    /// LAME VBR quality for mp3 output (0 = best, 9 = smallest).
    #[serde(default = "default_mp3_quality")]
    pub mp3_quality: u8,
    /// AAC bitrate for m4a output, ffmpeg syntax (e.g. "256k").
    #[serde(default = "default_m4a_bitrate")]
    pub m4a_bitrate: String,
}

fn default_mp3_quality() -> u8 {
    0
}

fn default_m4a_bitrate() -> String {
    "256k".to_string()
}

impl Default for MsrdConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            library_dir: PathBuf::from("music"),
            cache_dir: None,
            default_threads: None,
            ffmpeg: "ffmpeg".to_string(),
            connect_timeout_secs: 30,
            transfer_timeout_secs: 3600,
            mp3_quality: default_mp3_quality(),
            m4a_bitrate: default_m4a_bitrate(),
        }
    }
}

impl MsrdConfig {
    /// Worker count when the caller did not supply one: the configured
    /// default, else `min(32, cpus + 4)`.
    pub fn worker_count(&self, requested: Option<usize>) -> usize {
        requested
            .or(self.default_threads)
            .unwrap_or_else(|| {
                let cpus = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                (cpus + 4).min(32)
            })
            .max(1)
    }

    /// Effective cache directory (configured or `~/.cache/msrd`).
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let xdg_dirs = xdg::BaseDirectories::with_prefix("msrd")?;
                Ok(xdg_dirs.get_cache_home())
            }
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("msrd")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MsrdConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MsrdConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: MsrdConfig = toml::from_str(&data)?;
    Ok(cfg)
}
