//! Batch runner: fetch every manifest entry into the target directory.
//!
//! Entries are processed strictly in manifest order, one at a time. Each one
//! walks the phases
//! `Validate → Resolve → Prepare → Check → Fetch → Verify → Promote`
//! and ends in exactly one [`Outcome`]. Only run setup failures and (by default)
//! transport failures stop the batch; see [`RunError`].

mod outcome;

pub use outcome::{EntryReport, Outcome, Report};

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::checksum::{self, Verification};
use crate::config::FetchConfig;
use crate::error::RunError;
use crate::fetcher::{FetchError, Fetcher};
use crate::manifest::{self, Manifest, ManifestEntry};
use crate::sandbox;
use crate::storage;

/// Fetch everything listed at `manifest_url` into `target_dir`.
pub fn fetch_all(
    manifest_url: &str,
    target_dir: &Path,
    cfg: &FetchConfig,
) -> Result<Report, RunError> {
    Batch::prepare(target_dir, Fetcher::new(cfg.clone()))?.run(manifest_url)
}

/// A target directory ready to receive files.
#[derive(Debug)]
pub struct Batch {
    fetcher: Fetcher,
    target_dir: PathBuf,
}

/// An entry that passed validation and path resolution.
struct Job {
    index: usize,
    entry: ManifestEntry,
    final_path: PathBuf,
    staging: PathBuf,
}

enum Phase<'a> {
    Validate(&'a Value),
    Resolve(ManifestEntry),
    Prepare(Job),
    Check(Job),
    Fetch(Job),
    Verify(Job),
    Promote(Job),
}

enum Step<'a> {
    Next(Phase<'a>),
    Done(EntryReport),
    Abort(RunAbort),
}

/// Transport failure that ends the run.
struct RunAbort {
    entry: ManifestEntry,
    source: FetchError,
}

impl Batch {
    /// Make `target_dir` absolute and create it if needed.
    pub fn prepare(target_dir: &Path, fetcher: Fetcher) -> Result<Self, RunError> {
        let target_err = |source| RunError::TargetDir {
            path: target_dir.to_path_buf(),
            source,
        };
        let abs = sandbox::absolute_target(target_dir).map_err(target_err)?;
        std::fs::create_dir_all(&abs).map_err(target_err)?;
        tracing::info!(dir = %abs.display(), "saving files to directory");
        Ok(Batch {
            fetcher,
            target_dir: abs,
        })
    }

    /// Load the manifest at `manifest_url` and process it.
    pub fn run(&self, manifest_url: &str) -> Result<Report, RunError> {
        let manifest = manifest::load(&self.fetcher, manifest_url)?;
        self.run_manifest(&manifest)
    }

    /// Process an already loaded manifest.
    pub fn run_manifest(&self, manifest: &Manifest) -> Result<Report, RunError> {
        let mut report = Report::default();
        if manifest.is_empty() {
            tracing::info!("manifest is empty; no files to download");
            return Ok(report);
        }

        for (index, element) in manifest.elements.iter().enumerate() {
            match self.process(index, element) {
                Ok(entry_report) => report.push(entry_report),
                Err(RunAbort { entry, source }) => {
                    tracing::error!(
                        name = %entry.name,
                        url = %entry.url,
                        error = %source,
                        "unable to retrieve file; stopping"
                    );
                    return Err(RunError::EntryFetch {
                        name: entry.name,
                        url: entry.url,
                        source,
                        report: Box::new(report),
                    });
                }
            }
        }

        tracing::info!("done: {}", report.summary());
        Ok(report)
    }

    fn process(&self, index: usize, element: &Value) -> Result<EntryReport, RunAbort> {
        let mut phase = Phase::Validate(element);
        loop {
            phase = match self.step(index, phase) {
                Step::Next(next) => next,
                Step::Done(entry_report) => return Ok(entry_report),
                Step::Abort(abort) => return Err(abort),
            };
        }
    }

    fn step<'a>(&self, index: usize, phase: Phase<'a>) -> Step<'a> {
        match phase {
            Phase::Validate(element) => match ManifestEntry::from_value(element) {
                Ok(entry) => {
                    tracing::info!(name = %entry.name, url = %entry.url, "processing entry");
                    Step::Next(Phase::Resolve(entry))
                }
                Err(reason) => {
                    tracing::warn!(index, %reason, "skipping invalid entry");
                    Step::Done(EntryReport::invalid(index, element, reason.to_string()))
                }
            },

            Phase::Resolve(entry) => match sandbox::resolve(&self.target_dir, &entry.name) {
                Some(final_path) => {
                    let staging = storage::staging_path(&final_path);
                    Step::Next(Phase::Prepare(Job {
                        index,
                        entry,
                        final_path,
                        staging,
                    }))
                }
                None => {
                    tracing::warn!(
                        name = %entry.name,
                        dir = %self.target_dir.display(),
                        "path is not inside the target directory; skipping"
                    );
                    let detail = format!("not inside {}", self.target_dir.display());
                    Step::Done(EntryReport::for_entry(
                        index,
                        &entry,
                        Outcome::SkippedPathEscape,
                        None,
                        detail,
                    ))
                }
            },

            Phase::Prepare(job) => match sandbox::ensure_parent(&job.final_path) {
                Ok(()) => Step::Next(Phase::Check(job)),
                Err(e) => {
                    tracing::warn!(
                        path = %job.final_path.display(),
                        error = %e,
                        "unable to create parent directories; skipping"
                    );
                    job.done(Outcome::PersistError, None, e.to_string())
                }
            },

            Phase::Check(job) => {
                if job.final_path.is_file() {
                    tracing::info!(
                        path = %job.final_path.display(),
                        url = %job.entry.url,
                        "path exists; not downloading"
                    );
                    let path = Some(job.final_path.clone());
                    job.done(Outcome::SkippedExisting, path, "")
                } else {
                    Step::Next(Phase::Fetch(job))
                }
            }

            Phase::Fetch(job) => match self.fetcher.fetch(&job.entry.url, &job.staging) {
                Ok(bytes) => {
                    tracing::debug!(
                        url = %job.entry.url,
                        staging = %job.staging.display(),
                        bytes,
                        "fetched to staging file"
                    );
                    Step::Next(Phase::Verify(job))
                }
                Err(source) => self.fetch_failed(job, source),
            },

            Phase::Verify(job) => match checksum::verify(&job.entry.checksums, &job.staging) {
                Ok(Verification::Match) => Step::Next(Phase::Promote(job)),
                Ok(Verification::Mismatch {
                    algorithm,
                    expected,
                    actual,
                }) => {
                    tracing::warn!(
                        %algorithm,
                        %expected,
                        %actual,
                        staging = %job.staging.display(),
                        "expected hash does not match; leaving staging file"
                    );
                    let detail = format!("{} expected {}, got {}", algorithm, expected, actual);
                    let path = Some(job.staging.clone());
                    job.done(Outcome::HashMismatch, path, detail)
                }
                Err(e) => {
                    tracing::warn!(
                        staging = %job.staging.display(),
                        error = %format!("{:#}", e),
                        "unable to hash staging file"
                    );
                    let path = Some(job.staging.clone());
                    job.done(Outcome::PersistError, path, format!("{:#}", e))
                }
            },

            Phase::Promote(job) => match storage::promote(&job.staging, &job.final_path) {
                Ok(()) => {
                    tracing::info!(
                        url = %job.entry.url,
                        path = %job.final_path.display(),
                        "downloaded; all hashes match"
                    );
                    let path = Some(job.final_path.clone());
                    job.done(Outcome::Downloaded, path, "")
                }
                Err(e) => {
                    tracing::warn!(error = %format!("{:#}", e), "unable to save file; skipping");
                    let path = Some(job.staging.clone());
                    job.done(Outcome::PersistError, path, format!("{:#}", e))
                }
            },
        }
    }

    fn fetch_failed<'a>(&self, job: Job, source: FetchError) -> Step<'a> {
        if source.is_network() && self.fetcher.config().abort_on_fetch_error {
            return Step::Abort(RunAbort {
                entry: job.entry,
                source,
            });
        }
        let outcome = match source {
            FetchError::Write(_) => Outcome::PersistError,
            _ => Outcome::FetchError,
        };
        tracing::warn!(
            name = %job.entry.name,
            url = %job.entry.url,
            error = %source,
            "unable to retrieve file; skipping"
        );
        let path = job.staging.exists().then(|| job.staging.clone());
        job.done(outcome, path, source.to_string())
    }
}

impl Job {
    fn done<'a>(self, outcome: Outcome, path: Option<PathBuf>, detail: impl Into<String>) -> Step<'a> {
        Step::Done(EntryReport::for_entry(
            self.index,
            &self.entry,
            outcome,
            path,
            detail,
        ))
    }
}
