//! CLI command handlers. Each command is in its own file.

mod checksum;
mod fetch;
mod verify;

pub use checksum::run_checksum;
pub use fetch::run_fetch;
pub use verify::{run_verify, ExpectedDigests};
