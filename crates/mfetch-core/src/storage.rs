//! Staging files and atomic promotion.
//!
//! Downloads are written to `<final>.partial` and renamed to the final path
//! only after verification, so a final path never holds partial or corrupt
//! content. Failed staging files are left on disk for inspection.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Suffix of in-flight or failed-verification downloads.
pub const STAGING_SUFFIX: &str = ".partial";

/// Path for the staging file: appends `.partial` to the final path
/// (e.g. `data/file.iso` → `data/file.iso.partial`).
pub fn staging_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(STAGING_SUFFIX);
    PathBuf::from(o)
}

/// Buffered writer over a staging file. Truncates any previous staging file.
pub struct StagingWriter {
    out: BufWriter<File>,
    written: u64,
}

impl StagingWriter {
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(StagingWriter {
            out: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.out.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes written since creation.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush buffered data and sync it to disk. Consumes the writer and closes the file.
    pub fn finish(self) -> std::io::Result<u64> {
        let file = self.out.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(self.written)
    }
}

/// Atomically rename the staging file to the final path.
/// Both paths live in the same directory, so the rename never crosses filesystems.
pub fn promote(staging: &Path, final_path: &Path) -> Result<()> {
    std::fs::rename(staging, final_path).with_context(|| {
        format!(
            "failed to rename {} to {}",
            staging.display(),
            final_path.display()
        )
    })
}
