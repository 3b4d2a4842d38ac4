//! Fetch error type, split so the orchestrator can tell transport failures
//! (run-fatal by default) from staging-file failures (entry-local).

use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, DNS, TLS, etc.).
    Transport(curl::Error),
    /// HTTP response had a non-2xx status.
    Http { url: String, code: u32 },
    /// A `file:` source could not be read.
    Local { path: PathBuf, source: io::Error },
    /// Writing or reading back the staging file failed.
    Write(io::Error),
    /// The Drive confirmation page had no download link; the page layout changed.
    ConfirmationLinkMissing { url: String },
}

impl FetchError {
    /// True for failures retrieving the source (as opposed to persisting it).
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            FetchError::Transport(_) | FetchError::Http { .. } | FetchError::Local { .. }
        )
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Transport(e)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(e) => write!(f, "{}", e),
            FetchError::Http { url, code } => write!(f, "GET {} returned HTTP {}", url, code),
            FetchError::Local { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            FetchError::Write(e) => write!(f, "staging file: {}", e),
            FetchError::ConfirmationLinkMissing { url } => write!(
                f,
                "no direct download link on confirmation page for {}",
                url
            ),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Transport(e) => Some(e),
            FetchError::Local { source, .. } => Some(source),
            FetchError::Write(e) => Some(e),
            FetchError::Http { .. } | FetchError::ConfirmationLinkMissing { .. } => None,
        }
    }
}
