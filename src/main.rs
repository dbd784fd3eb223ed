// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments and environment variables using clap
// 2. Set up tracing for diagnostic logs
// 3. Scan every document in the docs directory and check its links
// 4. Print the report
// 5. Exit with proper code (0 = all links fine, 1 = broken links, placeholders,
//    or a fatal error such as an unreadable docs directory)
// =============================================================================

mod checker; // src/checker/ - link extraction and verification
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - resolved run configuration
mod error; // src/error.rs - errors that abort a run
mod report; // src/report.rs - console output
mod scan; // src/scan/ - document scanning and run coordination

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use report::Console;
use scan::RunCoordinator;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

// Log level:
// 1. --verbose sets debug for this crate
// 2. otherwise RUST_LOG, if set
// 3. otherwise warnings only
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("docs_link_gate=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docs_link_gate=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// Returns the process exit code; Err only for fatal problems
async fn run(cli: Cli) -> Result<i32> {
    let config = cli.into_config();
    tracing::debug!(?config, "resolved configuration");

    let console = Console::new(config.output, config.github_annotations);
    console.banner(&config.docs_path);

    let coordinator =
        RunCoordinator::from_config(config).context("failed to set up the link checker")?;
    let result = coordinator.run().await?;

    console.summary(&result)?;

    Ok(result.exit_code())
}
