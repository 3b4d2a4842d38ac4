//! Content retrieval for manifest entries and the manifest itself.
//!
//! Sources are a closed set picked from the URL shape: local `file:` URLs are
//! copied directly, Google Drive URLs take the confirmation-page flow, and
//! everything else is a plain libcurl GET.

pub mod drive;
mod error;
pub mod http;

pub use error::FetchError;

use percent_encoding::percent_decode_str;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use url::Url;

use crate::config::FetchConfig;
use crate::storage::StagingWriter;

const CHUNK_SIZE: usize = 4096;

/// Where an entry's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// `file:` URL; relative paths are taken from the current working directory.
    Local(PathBuf),
    /// Google Drive share or download link.
    Drive(String),
    /// Any other URL, handed to libcurl.
    Http(String),
}

impl Source {
    pub fn classify(url: &str) -> Source {
        if let Some(path) = local_path(url) {
            return Source::Local(path);
        }
        if drive::is_drive_url(url) {
            return Source::Drive(url.to_string());
        }
        Source::Http(url.to_string())
    }
}

/// Map a `file:` URL to a local path.
///
/// Accepts `file:relative/path`, `file:/abs`, `file:///abs` and
/// `file://localhost/abs`, all percent-decoded. URLs naming a remote host are
/// not local.
fn local_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("file:")?;
    if rest.is_empty() {
        return None;
    }
    if !rest.starts_with('/') {
        let decoded = percent_decode_str(rest).decode_utf8_lossy();
        return Some(PathBuf::from(decoded.into_owned()));
    }
    Url::parse(url).ok()?.to_file_path().ok()
}

/// Fetches URLs into staging files or memory using one transfer configuration.
#[derive(Debug, Clone, Default)]
pub struct Fetcher {
    cfg: FetchConfig,
}

impl Fetcher {
    pub fn new(cfg: FetchConfig) -> Self {
        Fetcher { cfg }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.cfg
    }

    /// Download `url` into `dest`, truncating it first. Returns bytes written.
    pub fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        match Source::classify(url) {
            Source::Local(path) => {
                let mut writer = StagingWriter::create(dest).map_err(FetchError::Write)?;
                copy_local(&path, |chunk| writer.write_chunk(chunk))?;
                writer.finish().map_err(FetchError::Write)
            }
            Source::Drive(url) => drive::download(&self.cfg, &url, dest),
            Source::Http(url) => {
                let mut writer = StagingWriter::create(dest).map_err(FetchError::Write)?;
                http::get(&self.cfg, &url, &[], |chunk| writer.write_chunk(chunk))?;
                writer.finish().map_err(FetchError::Write)
            }
        }
    }

    /// Retrieve `url` into memory. Drive links are fetched as plain URLs here.
    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut body = Vec::new();
        match Source::classify(url) {
            Source::Local(path) => {
                copy_local(&path, |chunk| {
                    body.extend_from_slice(chunk);
                    Ok(())
                })?;
            }
            Source::Drive(url) | Source::Http(url) => {
                http::get(&self.cfg, &url, &[], |chunk| {
                    body.extend_from_slice(chunk);
                    Ok(())
                })?;
            }
        }
        Ok(body)
    }
}

/// Stream a local file to `sink` in fixed-size chunks.
fn copy_local<F>(path: &Path, mut sink: F) -> Result<u64, FetchError>
where
    F: FnMut(&[u8]) -> std::io::Result<()>,
{
    let local_err = |source| FetchError::Local {
        path: path.to_path_buf(),
        source,
    };
    let mut f = File::open(path).map_err(local_err)?;
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = f.read(&mut buf).map_err(local_err)?;
        if n == 0 {
            break;
        }
        sink(&buf[..n]).map_err(FetchError::Write)?;
        total += n as u64;
    }
    Ok(total)
}
