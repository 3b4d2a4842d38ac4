//! Run-level errors: failures that stop a whole batch.
//!
//! Entry-local problems are not errors; they are recorded as
//! [`Outcome`](crate::batch::Outcome) values in the report.

use std::io;
use std::path::PathBuf;

use crate::batch::Report;
use crate::fetcher::FetchError;
use crate::manifest::ManifestError;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The target directory could not be created.
    #[error("unable to use target directory {}", path.display())]
    TargetDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The manifest could not be retrieved.
    #[error("unable to retrieve manifest {url}")]
    Network {
        url: String,
        #[source]
        source: FetchError,
    },
    /// The manifest was retrieved but is not a JSON array.
    #[error("unable to parse manifest {url}")]
    Format {
        url: String,
        #[source]
        source: ManifestError,
    },
    /// An entry's source could not be retrieved and the run is configured to
    /// stop on transport failures. `report` holds the entries finished before it.
    #[error("unable to retrieve {url} for entry {name}")]
    EntryFetch {
        name: String,
        url: String,
        #[source]
        source: FetchError,
        report: Box<Report>,
    },
}

impl RunError {
    /// Outcomes recorded before the run stopped, if any entries were processed.
    pub fn partial_report(&self) -> Option<&Report> {
        match self {
            RunError::EntryFetch { report, .. } => Some(report),
            _ => None,
        }
    }
}
