//! Tangle CLI binary.

use anyhow::Result;
use tangle::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the tangle CLI.
///
/// Uses tokio's current_thread runtime; the fetch phase fans requests out as
/// futures awaited in batches, so one OS thread is plenty.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // RUST_LOG wins over the verbose flag.
    // Example: RUST_LOG=tangle=trace cargo run -- analyse
    let default_filter = if cli.verbose {
        "tangle=debug"
    } else {
        "tangle=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    cli.execute().await
}
