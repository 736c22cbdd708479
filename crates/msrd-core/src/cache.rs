//! Source cache maintenance: list cached entries and delete them by filter.
//!
//! The cache dir holds one raw source per song (`<cid>.<ext>`) plus any
//! `.part` files left behind by interrupted downloads.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::storage;

/// One file in the cache dir.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub identifier: String,
    /// Source extension (`wav`, `mp3`, ...). Empty if the file has none.
    pub extension: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
    /// Leftover from an interrupted download.
    pub partial: bool,
}

impl CacheEntry {
    /// Time since last modification (zero if unknown or in the future).
    pub fn age(&self, now: SystemTime) -> Duration {
        self.modified
            .and_then(|m| now.duration_since(m).ok())
            .unwrap_or_default()
    }
}

/// Selects cache entries for deletion. An empty filter selects nothing.
#[derive(Debug, Clone, Default)]
pub struct CacheFilter {
    /// Only these identifiers (any age). Empty = not filtering by id.
    pub identifiers: Vec<String>,
    /// Only entries at least this old.
    pub older_than: Option<Duration>,
    /// Every entry.
    pub all: bool,
}

impl CacheFilter {
    pub fn is_empty(&self) -> bool {
        !self.all && self.identifiers.is_empty() && self.older_than.is_none()
    }

    pub fn matches(&self, entry: &CacheEntry, now: SystemTime) -> bool {
        if self.is_empty() {
            return false;
        }
        if !self.identifiers.is_empty() && !self.identifiers.contains(&entry.identifier) {
            return false;
        }
        if let Some(min_age) = self.older_than {
            if entry.age(now) < min_age {
                return false;
            }
        }
        true
    }
}

/// Identifier, extension and partial flag parsed from a cache file name.
/// `880.wav.part` → (`880`, `wav`, true).
fn parse_name(path: &Path) -> Option<(String, String, bool)> {
    let partial = storage::is_temp_path(path);
    let name_path = if partial {
        PathBuf::from(path.file_stem()?)
    } else {
        path.to_path_buf()
    };
    let identifier = name_path.file_stem()?.to_str()?.to_string();
    let extension = name_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string();
    Some((identifier, extension, partial))
}

/// Stat `path` into an entry. A file that vanished since the dir was read
/// (a concurrent download renaming its `.part`) yields `None`.
fn entry_from_path(path: PathBuf) -> Result<Option<CacheEntry>> {
    let Some((identifier, extension, partial)) = parse_name(&path) else {
        return Ok(None);
    };
    let meta = match fs::metadata(&path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("failed to stat {}", path.display())),
    };
    if !meta.is_file() {
        return Ok(None);
    }
    Ok(Some(CacheEntry {
        identifier,
        extension,
        size: meta.len(),
        modified: meta.modified().ok(),
        partial,
        path,
    }))
}

fn read_cache_dir(dir: &Path) -> Result<Option<fs::ReadDir>> {
    match fs::read_dir(dir) {
        Ok(r) => Ok(Some(r)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to read cache dir {}", dir.display())),
    }
}

/// All entries in `dir`, sorted by identifier. A missing dir is an empty cache.
pub fn list_entries(dir: &Path) -> Result<Vec<CacheEntry>> {
    let Some(read) = read_cache_dir(dir)? else {
        return Ok(Vec::new());
    };
    let mut entries = Vec::new();
    for dent in read {
        let dent = dent.context("failed to read cache dir entry")?;
        if let Some(entry) = entry_from_path(dent.path())? {
            entries.push(entry);
        }
    }
    entries.sort_by(|a, b| a.identifier.cmp(&b.identifier).then(a.path.cmp(&b.path)));
    Ok(entries)
}

/// The complete (non-partial) cached source for `identifier`, if any.
///
/// Only files named `<identifier>.<ext>` are stat'ed, so downloads of other
/// songs in the same dir never affect the lookup.
pub fn find_entry(dir: &Path, identifier: &str) -> Result<Option<CacheEntry>> {
    let Some(read) = read_cache_dir(dir)? else {
        return Ok(None);
    };
    let mut candidates: Vec<PathBuf> = Vec::new();
    for dent in read {
        let path = dent.context("failed to read cache dir entry")?.path();
        if matches!(parse_name(&path), Some((id, _, false)) if id == identifier) {
            candidates.push(path);
        }
    }
    candidates.sort();
    for path in candidates {
        if let Some(entry) = entry_from_path(path)? {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}

/// Delete every entry matching `filter`. Returns the deleted entries.
pub fn delete_entries(dir: &Path, filter: &CacheFilter) -> Result<Vec<CacheEntry>> {
    let now = SystemTime::now();
    let mut deleted = Vec::new();
    for entry in list_entries(dir)? {
        if !filter.matches(&entry, now) {
            continue;
        }
        match fs::remove_file(&entry.path) {
            Ok(()) => {
                tracing::debug!(path = %entry.path.display(), "deleted cache entry");
                deleted.push(entry);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("could not delete {}", entry.path.display()))
            }
        }
    }
    Ok(deleted)
}
