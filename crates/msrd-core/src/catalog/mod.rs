//! Remote catalog listing.
//!
//! The resolver only depends on the [`Catalog`] trait; [`HttpCatalog`] is the
//! implementation backed by the song API.

mod api;

use serde::Deserialize;

use crate::error::CatalogError;

pub use api::{HttpCatalog, SongDetail};

/// One song as listed by the catalog. Only `cid` is used by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(default)]
    pub cid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub album_cid: Option<String>,
    #[serde(default)]
    pub artists: Vec<String>,
}

impl CatalogEntry {
    pub fn with_cid(cid: impl Into<String>) -> Self {
        Self {
            cid: Some(cid.into()),
            ..Self::default()
        }
    }
}

/// Lists every known song, in the catalog's natural order.
///
/// Blocking; call from `spawn_blocking` if used from async code.
pub trait Catalog: Send + Sync {
    fn list(&self) -> Result<Vec<CatalogEntry>, CatalogError>;
}
