//! `mfetch fetch` – download a manifest's files into a directory.

use anyhow::{Context, Result};
use mfetch_core::config::FetchConfig;
use mfetch_core::{fetch_all, Report};
use std::path::PathBuf;

pub async fn run_fetch(cfg: FetchConfig, manifest_url: String, target_dir: PathBuf) -> Result<()> {
    println!("Saving files to directory {}", target_dir.display());
    println!("Retrieving list of files to download from {}", manifest_url);

    // The pipeline does blocking curl and file I/O.
    let result = tokio::task::spawn_blocking(move || fetch_all(&manifest_url, &target_dir, &cfg))
        .await
        .context("fetch task failed")?;

    match result {
        Ok(report) => {
            if report.is_empty() {
                println!("Manifest is empty. No files to download.");
            } else {
                print_report(&report);
            }
            Ok(())
        }
        Err(err) => {
            if let Some(partial) = err.partial_report() {
                print_report(partial);
            }
            Err(err.into())
        }
    }
}

fn print_report(report: &Report) {
    for entry in report {
        match &entry.path {
            Some(path) if entry.outcome.is_failure() => {
                println!("{} -> {}", entry, path.display())
            }
            _ => println!("{}", entry),
        }
    }
    println!("Done: {}", report.summary());
}
