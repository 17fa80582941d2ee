//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pbilocate - Power BI Desktop engine locator
///
/// Finds Power BI Desktop installations and the bundled Analysis Services
/// engine, and relocates Store-channel engines into a runnable per-user copy.
#[derive(Parser, Debug)]
#[command(
    name = "pbilocate",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Locator for the Analysis Services engine bundled with Power BI Desktop",
    long_about = "pbilocate discovers Power BI Desktop installations across the Microsoft \
                  Store, the classic installer, and an operator-supplied directory, picks \
                  the authoritative one, and can shadow-copy the bundled Analysis Services \
                  engine (msmdsrv.exe) into a per-user directory where it is allowed to run.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  pbilocate locate\n    \
                  pbilocate list --json\n    \
                  pbilocate find-server\n    \
                  pbilocate shadow-copy\n\n\
                  \x1b[1m\x1b[32mEnvironment:\x1b[0m\n    \
                  PBILOCATE_INSTALL_DIR  override automatic discovery with a directory\n    \
                  PBILOCATE_DATA_DIR     override the shadow-copy cache location"
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the selected installation
    Locate,

    /// List all discovered installation candidates
    List(ListArgs),

    /// Resolve the path of the Analysis Services engine
    FindServer,

    /// Copy a Store-channel engine into the per-user cache
    ShadowCopy(ShadowCopyArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the list command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List all candidates:\n    pbilocate list\n\n\
                  Machine-readable output:\n    pbilocate list --json")]
pub struct ListArgs {
    /// Emit the candidate set as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the shadow-copy command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Relocate the engine of the selected installation:\n    pbilocate shadow-copy\n\n\
                  Relocate an explicit engine binary:\n    \
                  pbilocate shadow-copy --source \"C:\\...\\WindowsApps\\Microsoft.MicrosoftPowerBIDesktop_2.91.884.0_x64__8wekyb3d8bbwe\\bin\\msmdsrv.exe\"")]
pub struct ShadowCopyArgs {
    /// Engine path to relocate (defaults to the selected installation's engine)
    #[arg(long)]
    pub source: Option<PathBuf>,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    pbilocate completions --shell bash > ~/.bash_completion.d/pbilocate\n\n\
                  Generate zsh completions:\n    pbilocate completions --shell zsh > ~/.zfunc/_pbilocate")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(long)]
    pub shell: String,
}
