//! `msrd cache list|delete` – inspect or clean the source cache.

use anyhow::Result;
use msrd_core::cache::{self, CacheFilter};
use msrd_core::config::MsrdConfig;
use std::time::{Duration, SystemTime};

const SECS_PER_DAY: u64 = 86_400;

pub fn run_cache_list(cfg: &MsrdConfig) -> Result<()> {
    let dir = cfg.cache_dir()?;
    let entries = cache::list_entries(&dir)?;
    if entries.is_empty() {
        println!("Cache is empty ({}).", dir.display());
        return Ok(());
    }

    let now = SystemTime::now();
    let mut total = 0u64;
    println!("{:<12} {:<6} {:>12} {:>6} {}", "ID", "EXT", "SIZE (KiB)", "DAYS", "STATE");
    for e in &entries {
        total += e.size;
        println!(
            "{:<12} {:<6} {:>12} {:>6} {}",
            e.identifier,
            e.extension,
            e.size / 1024,
            e.age(now).as_secs() / SECS_PER_DAY,
            if e.partial { "partial" } else { "complete" }
        );
    }
    println!(
        "{} file(s), {:.1} MiB in {}",
        entries.len(),
        total as f64 / 1_048_576.0,
        dir.display()
    );
    Ok(())
}

pub fn run_cache_delete(
    cfg: &MsrdConfig,
    ids: Vec<String>,
    older_than_days: Option<u64>,
    all: bool,
) -> Result<()> {
    let filter = CacheFilter {
        identifiers: ids,
        older_than: older_than_days.map(|d| Duration::from_secs(d * SECS_PER_DAY)),
        all,
    };
    if filter.is_empty() {
        println!("Nothing selected: pass song IDs, --older-than DAYS, or --all.");
        return Ok(());
    }

    let dir = cfg.cache_dir()?;
    let deleted = cache::delete_entries(&dir, &filter)?;
    let freed: u64 = deleted.iter().map(|e| e.size).sum();
    println!(
        "Deleted {} cached file(s), freed {:.1} MiB",
        deleted.len(),
        freed as f64 / 1_048_576.0
    );
    Ok(())
}
