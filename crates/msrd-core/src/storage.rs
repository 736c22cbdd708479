//! File lifecycle for downloads and transcodes.
//!
//! Every output is written to `<final>.part` and atomically renamed into
//! place, so the library and cache never contain half-written files and
//! concurrent jobs never see each other's partial output.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `514.flac` → `514.flac.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// True if `path` is an in-progress temp file.
pub fn is_temp_path(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == &TEMP_SUFFIX[1..])
}

/// Sequential writer for a `.part` file. Dropped without `finalize`, the temp file is removed.
pub struct PartFile {
    file: Option<File>,
    temp_path: PathBuf,
    final_path: PathBuf,
}

impl PartFile {
    /// Create (truncating) the temp file for `final_path`, creating parent dirs as needed.
    pub fn create(final_path: &Path) -> Result<Self> {
        if let Some(parent) = final_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directory: {}", parent.display()))?;
            }
        }
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("failed to create temp file: {}", temp_path.display()))?;
        Ok(PartFile {
            file: Some(file),
            temp_path,
            final_path: final_path.to_path_buf(),
        })
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Close the handle without finalizing; used when an external process writes the temp path.
    pub fn close(&mut self) {
        self.file = None;
    }

    /// Sync and atomically rename the temp file to the final path.
    pub fn finalize(mut self) -> Result<PathBuf> {
        if let Some(file) = self.file.take() {
            file.sync_all().context("storage sync failed")?;
        }
        std::fs::rename(&self.temp_path, &self.final_path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                self.temp_path.display(),
                self.final_path.display()
            )
        })?;
        Ok(std::mem::take(&mut self.final_path))
    }
}

impl Write for PartFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.as_mut() {
            Some(f) => f.write(buf),
            None => Err(io::Error::new(io::ErrorKind::Other, "part file closed")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        // Finalized files have an empty final_path; anything else is abandoned.
        if !self.final_path.as_os_str().is_empty() {
            self.file = None;
            let _ = std::fs::remove_file(&self.temp_path);
        }
    }
}
