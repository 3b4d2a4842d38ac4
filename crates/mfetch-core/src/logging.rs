//! Tracing setup for the `mfetch` binary.
//!
//! Events go to an append-only file under the XDG state directory. When that
//! file cannot be opened, they go to stderr instead so a run is never blocked
//! on logging.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,mfetch=debug,mfetch_core=debug";
const LOG_FILE_NAME: &str = "mfetch.log";

/// Where log events are written after [`init`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// `$XDG_STATE_HOME/mfetch/mfetch.log`, creating the directory.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mfetch")?;
    let dir = xdg_dirs.get_state_home().join("mfetch");
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir.join(LOG_FILE_NAME))
}

/// Install the global subscriber, preferring the log file.
pub fn init() -> LogTarget {
    match log_file_path().and_then(|p| open_log(&p).map(|f| (p, f))) {
        Ok((path, file)) => {
            install(LogFile(file));
            tracing::info!(path = %path.display(), "mfetch logging initialized");
            LogTarget::File(path)
        }
        Err(err) => {
            install(io::stderr);
            tracing::warn!("file logging unavailable: {:#}", err);
            LogTarget::Stderr
        }
    }
}

fn open_log(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// A second install (e.g. from tests) keeps the first subscriber.
fn install<W>(writer: W)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
}

/// Hands each event a clone of the log file handle.
struct LogFile(File);

/// Per-event writer; stderr when the handle could not be cloned.
enum LogSink {
    File(File),
    Stderr,
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        match self.0.try_clone() {
            Ok(f) => LogSink::File(f),
            Err(_) => LogSink::Stderr,
        }
    }
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(f) => f.write(buf),
            LogSink::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(f) => f.flush(),
            LogSink::Stderr => io::stderr().lock().flush(),
        }
    }
}
