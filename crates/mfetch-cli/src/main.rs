use mfetch_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible; stderr if the state dir is unusable.
    let target = logging::init();
    tracing::debug!(?target, "log target");

    // Parse CLI and dispatch.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("mfetch error: {:#}", err);
        std::process::exit(1);
    }
}
