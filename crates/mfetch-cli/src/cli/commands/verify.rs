//! `mfetch verify` – check a local file against expected digests.

use anyhow::Result;
use clap::Args;
use mfetch_core::checksum::{self, Algorithm, Checksums, Verification};
use std::path::Path;

/// Expected digests, one optional flag per supported algorithm.
#[derive(Debug, Clone, Default, Args)]
pub struct ExpectedDigests {
    #[arg(long, value_name = "HEX")]
    pub md5: Option<String>,
    #[arg(long, value_name = "HEX")]
    pub sha1: Option<String>,
    #[arg(long, value_name = "HEX")]
    pub sha224: Option<String>,
    #[arg(long, value_name = "HEX")]
    pub sha256: Option<String>,
    #[arg(long, value_name = "HEX")]
    pub sha384: Option<String>,
    #[arg(long, value_name = "HEX")]
    pub sha512: Option<String>,
}

impl ExpectedDigests {
    pub fn to_checksums(&self) -> Checksums {
        [
            (Algorithm::Md5, &self.md5),
            (Algorithm::Sha1, &self.sha1),
            (Algorithm::Sha224, &self.sha224),
            (Algorithm::Sha256, &self.sha256),
            (Algorithm::Sha384, &self.sha384),
            (Algorithm::Sha512, &self.sha512),
        ]
        .into_iter()
        .filter_map(|(a, v)| v.clone().map(|hex| (a, hex)))
        .collect()
    }
}

pub async fn run_verify(path: &Path, expected: &ExpectedDigests) -> Result<()> {
    let checksums = expected.to_checksums();
    if checksums.is_empty() {
        println!("{}: no digests given; nothing to check", path.display());
        return Ok(());
    }
    match checksum::verify(&checksums, path)? {
        Verification::Match => {
            println!("{}: OK ({} digest(s) match)", path.display(), checksums.len());
            Ok(())
        }
        Verification::Mismatch {
            algorithm,
            expected,
            actual,
        } => anyhow::bail!(
            "{}: expected {} hash {} does not match {}",
            path.display(),
            algorithm,
            expected,
            actual
        ),
    }
}
