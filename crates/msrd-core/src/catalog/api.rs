//! Song API client: `GET {base}/songs` and `GET {base}/song/{cid}`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::config::MsrdConfig;
use crate::error::CatalogError;
use crate::http::{self, HttpOptions};

use super::{Catalog, CatalogEntry};

/// Every API response is wrapped in `{ code, msg, data }`; `code != 0` is an error.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    msg: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct SongList {
    list: Vec<CatalogEntry>,
}

/// Detail record for one song; `source_url` points at the original audio.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDetail {
    pub cid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub album_cid: Option<String>,
    pub source_url: String,
    #[serde(default)]
    pub artists: Vec<String>,
}

/// Catalog backed by the remote song API.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    base: Url,
    opts: HttpOptions,
}

impl HttpCatalog {
    pub fn new(cfg: &MsrdConfig) -> Result<Self, CatalogError> {
        // Trailing slash so `join` appends instead of replacing the last segment.
        let mut base = cfg.api_base.trim_end_matches('/').to_string();
        base.push('/');
        Ok(Self {
            base: Url::parse(&base)?,
            opts: HttpOptions {
                connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
                // API calls are small; cap them well below the source transfer timeout.
                transfer_timeout: Duration::from_secs(cfg.connect_timeout_secs.max(1) * 2),
            },
        })
    }

    pub fn songs_url(&self) -> Result<Url, CatalogError> {
        Ok(self.base.join("songs")?)
    }

    pub fn song_url(&self, cid: &str) -> Result<Url, CatalogError> {
        Ok(self.base.join(&format!("song/{cid}"))?)
    }

    /// Look up one song, including its source audio URL.
    pub fn song_detail(&self, cid: &str) -> Result<SongDetail, CatalogError> {
        let url = self.song_url(cid)?;
        self.get_json(&url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, CatalogError> {
        tracing::debug!(url = %url, "api request");
        let (code, body) = http::get_bytes(url.as_str(), self.opts)?;
        if !(200..300).contains(&code) {
            return Err(CatalogError::Http(code));
        }
        decode(&body)
    }
}

/// Unwrap an API envelope.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, CatalogError> {
    let envelope: Envelope<T> = serde_json::from_slice(body)?;
    match envelope {
        Envelope {
            code: 0,
            data: Some(data),
            ..
        } => Ok(data),
        Envelope { code, msg, .. } => Err(CatalogError::Api { code, msg }),
    }
}

impl Catalog for HttpCatalog {
    fn list(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let url = self.songs_url()?;
        let songs: SongList = self.get_json(&url)?;
        tracing::info!(count = songs.list.len(), "catalog listed");
        Ok(songs.list)
    }
}
