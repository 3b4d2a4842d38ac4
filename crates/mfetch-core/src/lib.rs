pub mod config;
pub mod error;
pub mod logging;

pub mod batch;
pub mod checksum;
pub mod fetcher;
pub mod manifest;
pub mod sandbox;
pub mod storage;

pub use batch::{fetch_all, Batch, EntryReport, Outcome, Report};
pub use error::RunError;
