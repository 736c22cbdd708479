//! In-memory collaborators with call recording and concurrency instrumentation.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use msrd_core::assets::MediaAssets;
use msrd_core::catalog::{Catalog, CatalogEntry};
use msrd_core::codec::Codec;
use msrd_core::error::{AssetError, CatalogError};

/// Catalog returning a fixed listing and counting how often it was asked.
pub struct FakeCatalog {
    entries: Vec<CatalogEntry>,
    pub list_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new(cids: &[&str]) -> Self {
        Self::with_entries(cids.iter().map(|c| CatalogEntry::with_cid(*c)).collect())
    }

    pub fn with_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

impl Catalog for FakeCatalog {
    fn list(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.clone())
    }
}

/// Media assets that sleep for `work` per call and track peak concurrency.
#[derive(Default)]
pub struct FakeAssets {
    /// (cid, codec) pairs already in the library.
    present: HashSet<(String, Codec)>,
    /// cids with a cached source (transcode succeeds).
    cached: HashSet<String>,
    /// cids whose fetch fails.
    failing: HashSet<String>,
    /// cids whose fetch panics.
    panicking: HashSet<String>,
    work: Duration,
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl FakeAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_work(mut self, work: Duration) -> Self {
        self.work = work;
        self
    }

    pub fn present(mut self, cid: &str, codec: Codec) -> Self {
        self.present.insert((cid.to_string(), codec));
        self
    }

    pub fn cached(mut self, cid: &str) -> Self {
        self.cached.insert(cid.to_string());
        self
    }

    pub fn failing(mut self, cid: &str) -> Self {
        self.failing.insert(cid.to_string());
        self
    }

    pub fn panicking(mut self, cid: &str) -> Self {
        self.panicking.insert(cid.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(&self, call: String) {
        self.calls.lock().unwrap().push(call);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.work.is_zero() {
            std::thread::sleep(self.work);
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MediaAssets for FakeAssets {
    fn is_present(&self, identifier: &str, codec: Codec) -> bool {
        self.present.contains(&(identifier.to_string(), codec))
    }

    fn fetch(&self, identifier: &str, codec: Codec) -> Result<(), AssetError> {
        self.enter(format!("fetch {identifier} {codec}"));
        self.leave();
        if self.panicking.contains(identifier) {
            panic!("collaborator blew up on {identifier}");
        }
        if self.failing.contains(identifier) {
            return Err(AssetError::collaborator(identifier, "HTTP 503"));
        }
        Ok(())
    }

    fn transcode(&self, identifier: &str, codecs: &[Codec]) -> Result<(), AssetError> {
        let list: Vec<String> = codecs.iter().map(|c| c.to_string()).collect();
        self.enter(format!("transcode {identifier} {}", list.join(",")));
        self.leave();
        if self.cached.contains(identifier) {
            Ok(())
        } else {
            Err(AssetError::source_absent(identifier))
        }
    }
}
