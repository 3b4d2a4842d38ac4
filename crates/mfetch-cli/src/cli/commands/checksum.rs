//! Checksum command: compute a digest of a file.

use anyhow::Result;
use mfetch_core::checksum::{self, Algorithm};
use std::path::Path;

/// Compute and print the digest of the given file, `sha256sum` style.
pub async fn run_checksum(path: &Path, algorithm: Algorithm) -> Result<()> {
    let digest = checksum::digest_path(algorithm, path)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
