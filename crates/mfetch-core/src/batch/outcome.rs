//! Per-entry outcomes and the batch report.

use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

use crate::manifest::ManifestEntry;

/// Terminal state of one manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Fetched, verified and promoted to its final path.
    Downloaded,
    /// Final path already existed; nothing fetched.
    SkippedExisting,
    /// Element was not an object or lacked `name`/`url`.
    SkippedInvalidEntry,
    /// `name` resolved outside the target directory.
    SkippedPathEscape,
    /// A checksum differed; the staging file was kept.
    HashMismatch,
    /// Source could not be retrieved (entry-local).
    FetchError,
    /// Directory creation, staging write or rename failed.
    PersistError,
}

impl Outcome {
    pub const ALL: [Outcome; 7] = [
        Outcome::Downloaded,
        Outcome::SkippedExisting,
        Outcome::SkippedInvalidEntry,
        Outcome::SkippedPathEscape,
        Outcome::HashMismatch,
        Outcome::FetchError,
        Outcome::PersistError,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Downloaded => "downloaded",
            Outcome::SkippedExisting => "skipped (exists)",
            Outcome::SkippedInvalidEntry => "skipped (invalid entry)",
            Outcome::SkippedPathEscape => "skipped (path escape)",
            Outcome::HashMismatch => "hash mismatch",
            Outcome::FetchError => "fetch error",
            Outcome::PersistError => "persist error",
        }
    }

    /// True for outcomes where a wanted file did not end up on disk.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Outcome::HashMismatch | Outcome::FetchError | Outcome::PersistError
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one entry with enough context for a diagnostic line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    /// Position in the manifest array.
    pub index: usize,
    pub name: Option<String>,
    pub url: Option<String>,
    pub outcome: Outcome,
    /// Final path, or the staging path when the staging file was kept.
    pub path: Option<PathBuf>,
    pub detail: String,
}

impl EntryReport {
    pub(crate) fn for_entry(
        index: usize,
        entry: &ManifestEntry,
        outcome: Outcome,
        path: Option<PathBuf>,
        detail: impl Into<String>,
    ) -> Self {
        EntryReport {
            index,
            name: Some(entry.name.clone()),
            url: Some(entry.url.clone()),
            outcome,
            path,
            detail: detail.into(),
        }
    }

    /// Report for an element that failed validation; keeps whatever string
    /// `name`/`url` it had for the diagnostic.
    pub(crate) fn invalid(index: usize, element: &Value, detail: impl Into<String>) -> Self {
        let field = |key: &str| element.get(key).and_then(Value::as_str).map(str::to_string);
        EntryReport {
            index,
            name: field("name"),
            url: field("url"),
            outcome: Outcome::SkippedInvalidEntry,
            path: None,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for EntryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.index,
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.outcome
        )?;
        if !self.detail.is_empty() {
            write!(f, " ({})", self.detail)?;
        }
        Ok(())
    }
}

/// Outcomes of a batch in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub entries: Vec<EntryReport>,
}

impl Report {
    pub fn push(&mut self, entry: EntryReport) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EntryReport> {
        self.entries.iter()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.entries.iter().filter(|e| e.outcome == outcome).count()
    }

    /// True when no entry ended in a failure outcome. Skips are not failures.
    pub fn is_clean(&self) -> bool {
        !self.entries.iter().any(|e| e.outcome.is_failure())
    }

    /// One-line tally, e.g. `3 entries: 2 downloaded, 1 hash mismatch`.
    pub fn summary(&self) -> String {
        let parts: Vec<String> = Outcome::ALL
            .iter()
            .map(|&o| (o, self.count(o)))
            .filter(|&(_, n)| n > 0)
            .map(|(o, n)| format!("{} {}", n, o))
            .collect();
        if parts.is_empty() {
            format!("{} entries", self.len())
        } else {
            format!("{} entries: {}", self.len(), parts.join(", "))
        }
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a EntryReport;
    type IntoIter = std::slice::Iter<'a, EntryReport>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
