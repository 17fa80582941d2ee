//! pbilocate - Power BI Desktop engine locator
//!
//! Discovers Power BI Desktop installations across three channels (an operator
//! override, the Microsoft Store package repository, and the classic installer
//! registry), selects the authoritative one, and relocates the bundled
//! Analysis Services engine into a per-user runnable copy when the Store
//! channel's execute restrictions apply.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod error;
mod libresolve;
mod locator;
mod progress;
mod resolver;
mod selector;
mod shadow;
mod version;

use cli::{Cli, Commands};

/// Install the tracing subscriber. `RUST_LOG` wins; otherwise `-v` raises the
/// level so skipped catalog entries become visible.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "pbilocate=debug"
    } else {
        "pbilocate=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Locate => commands::locate::run(),
        Commands::List(args) => commands::list::run(args),
        Commands::FindServer => commands::find_server::run(),
        Commands::ShadowCopy(args) => commands::shadow_copy::run(args),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
