//! Manifest loading: fetch a URL and decode it as a JSON array of entries.
//!
//! Only the top-level shape is checked here. Elements are kept as raw JSON and
//! validated one at a time by the batch runner, so a bad element is reported
//! in order without rejecting the whole manifest.

mod entry;

pub use entry::{InvalidEntry, ManifestEntry};

use serde_json::Value;

use crate::error::RunError;
use crate::fetcher::Fetcher;

/// Decoded manifest: the elements of the top-level JSON array, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    pub elements: Vec<Value>,
}

impl Manifest {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Each element validated into an entry (or the reason it is invalid).
    pub fn entries(&self) -> impl Iterator<Item = Result<ManifestEntry, InvalidEntry>> + '_ {
        self.elements.iter().map(ManifestEntry::from_value)
    }
}

/// Why manifest content could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("content is not valid UTF-8")]
    NotUtf8(#[source] std::str::Utf8Error),
    #[error("content is not valid JSON")]
    Json(#[source] serde_json::Error),
    #[error("content is not a JSON array")]
    NotAnArray,
}

/// Decode manifest bytes: UTF-8, then JSON, then require an array.
pub fn parse(bytes: &[u8]) -> Result<Manifest, ManifestError> {
    let text = std::str::from_utf8(bytes).map_err(ManifestError::NotUtf8)?;
    match serde_json::from_str::<Value>(text).map_err(ManifestError::Json)? {
        Value::Array(elements) => Ok(Manifest { elements }),
        _ => Err(ManifestError::NotAnArray),
    }
}

/// Fetch and decode the manifest at `url`.
pub fn load(fetcher: &Fetcher, url: &str) -> Result<Manifest, RunError> {
    tracing::info!(url, "retrieving list of files to download");
    let bytes = fetcher.get_bytes(url).map_err(|source| RunError::Network {
        url: url.to_string(),
        source,
    })?;
    let manifest = parse(&bytes).map_err(|source| RunError::Format {
        url: url.to_string(),
        source,
    })?;
    tracing::debug!(url, entries = manifest.len(), "manifest decoded");
    Ok(manifest)
}
