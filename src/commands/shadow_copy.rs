//! Shadow-copy command implementation
//!
//! Relocates a Store-channel engine into the per-user cache. With no
//! `--source`, the selected installation's engine is relocated; an explicit
//! `--source` skips discovery entirely and relocates that binary's tree.

use console::Style;

use crate::cli::ShadowCopyArgs;
use crate::error::{PbiLocateError, Result};
use crate::resolver::DependenciesResolver;
use crate::shadow::{ShadowCopyEngine, split_packaged_source};

/// Run shadow-copy command
pub fn run(args: ShadowCopyArgs) -> Result<()> {
    let source = match args.source {
        Some(path) => path,
        None => {
            let resolver = DependenciesResolver::from_system();
            let found = resolver.try_find_server_executable()?;
            if found.relocated {
                println!("{}", found.path.display());
                eprintln!(
                    "{}",
                    Style::new().dim().apply_to("(already relocated, nothing to do)")
                );
                return Ok(());
            }
            if !found.available {
                return Err(PbiLocateError::ServerExecutableNotFound {
                    install_dir: resolver.effective_install_dir()?.display().to_string(),
                });
            }
            found.path
        }
    };

    let Some((source_dir, identity)) = split_packaged_source(&source) else {
        return Err(PbiLocateError::UnsupportedRelocationSource {
            path: source.display().to_string(),
        });
    };

    let engine = ShadowCopyEngine::new()?.with_progress(console::Term::stderr().is_term());
    let server = engine.copy(&source_dir, &identity)?;

    println!("{}", server.display());
    Ok(())
}
