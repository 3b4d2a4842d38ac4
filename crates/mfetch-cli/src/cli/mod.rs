//! CLI for mfetch.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mfetch_core::checksum::Algorithm;
use mfetch_core::config;
use std::path::PathBuf;

use commands::{run_checksum, run_fetch, run_verify, ExpectedDigests};

/// Top-level CLI for mfetch.
#[derive(Debug, Parser)]
#[command(name = "mfetch")]
#[command(about = "mfetch: download files listed in a JSON manifest and verify their checksums", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every file listed in a manifest into a directory.
    Fetch {
        /// URL of the JSON manifest (http, https or file).
        manifest_url: String,

        /// Directory to save files to; created if missing.
        target_dir: PathBuf,

        /// Record per-file network failures and continue instead of stopping the run.
        #[arg(long)]
        keep_going: bool,

        /// Connection timeout in seconds (overrides config.toml).
        #[arg(long, value_name = "SECS")]
        connect_timeout: Option<u64>,
    },

    /// Compute the digest of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,

        /// Digest algorithm.
        #[arg(short, long, default_value = "sha256")]
        algorithm: Algorithm,
    },

    /// Check a file against expected digests, as done for downloaded files.
    Verify {
        /// Path to the file.
        path: PathBuf,

        #[command(flatten)]
        expected: ExpectedDigests,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Fetch {
                manifest_url,
                target_dir,
                keep_going,
                connect_timeout,
            } => {
                let mut cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                if keep_going {
                    cfg.abort_on_fetch_error = false;
                }
                if let Some(secs) = connect_timeout {
                    cfg.connect_timeout_secs = secs;
                }
                run_fetch(cfg, manifest_url, target_dir).await?;
            }
            CliCommand::Checksum { path, algorithm } => run_checksum(&path, algorithm).await?,
            CliCommand::Verify { path, expected } => run_verify(&path, &expected).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
