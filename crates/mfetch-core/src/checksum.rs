//! Checksum verification of downloaded files.
//!
//! Digests are computed after the transfer completes, by streaming the staging
//! file through each requested algorithm. Supported algorithms are fixed:
//! MD5, SHA-1, SHA-224, SHA-256, SHA-384 and SHA-512.

use anyhow::{Context, Result};
use sha2::Digest;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

const BUF_SIZE: usize = 4096;

/// Digest algorithm recognized in manifest entries.
///
/// Variant order is the order in which checksums are checked, so the first
/// reported mismatch is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::Md5,
        Algorithm::Sha1,
        Algorithm::Sha224,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha512,
    ];

    /// Manifest key for this algorithm (e.g. `"sha256"`).
    pub fn key(self) -> &'static str {
        match self {
            Algorithm::Md5 => "md5",
            Algorithm::Sha1 => "sha1",
            Algorithm::Sha224 => "sha224",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha384 => "sha384",
            Algorithm::Sha512 => "sha512",
        }
    }

    /// Parses a manifest key. Unknown keys yield `None`.
    pub fn from_key(key: &str) -> Option<Algorithm> {
        Algorithm::ALL.into_iter().find(|a| a.key() == key)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    /// Case-insensitive, unlike manifest keys, for command-line use.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Algorithm::from_key(&s.to_ascii_lowercase()).ok_or_else(|| {
            let known: Vec<&str> = Algorithm::ALL.iter().map(|a| a.key()).collect();
            format!("unknown algorithm '{}' (expected one of {})", s, known.join(", "))
        })
    }
}

/// Expected digests for one file, keyed by algorithm.
pub type Checksums = BTreeMap<Algorithm, String>;

/// Result of checking a file against its expected digests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Every supplied digest matched (or none were supplied).
    Match,
    /// First algorithm whose digest differed.
    Mismatch {
        algorithm: Algorithm,
        expected: String,
        actual: String,
    },
}

impl Verification {
    pub fn is_match(&self) -> bool {
        matches!(self, Verification::Match)
    }
}

/// Compute the digest of a file with `algorithm` and return it as lowercase hex.
/// Reads in 4 KiB chunks to keep memory use bounded.
pub fn digest_path(algorithm: Algorithm, path: &Path) -> Result<String> {
    match algorithm {
        Algorithm::Md5 => hash_with::<md5::Md5>(path),
        Algorithm::Sha1 => hash_with::<sha1::Sha1>(path),
        Algorithm::Sha224 => hash_with::<sha2::Sha224>(path),
        Algorithm::Sha256 => hash_with::<sha2::Sha256>(path),
        Algorithm::Sha384 => hash_with::<sha2::Sha384>(path),
        Algorithm::Sha512 => hash_with::<sha2::Sha512>(path),
    }
}

fn hash_with<D: Digest>(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = D::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Check `path` against every digest in `checksums`.
///
/// Comparison is exact string equality against the lowercase hex digest, so an
/// uppercase expected value never matches. Stops at the first mismatch.
pub fn verify(checksums: &Checksums, path: &Path) -> Result<Verification> {
    for (&algorithm, expected) in checksums {
        let actual = digest_path(algorithm, path)?;
        if actual != *expected {
            return Ok(Verification::Mismatch {
                algorithm,
                expected: expected.clone(),
                actual,
            });
        }
        tracing::debug!(%algorithm, path = %path.display(), "checksum matched");
    }
    Ok(Verification::Match)
}
