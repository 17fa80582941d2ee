//! Find-server command implementation

use console::Style;

use crate::error::{PbiLocateError, Result};
use crate::resolver::DependenciesResolver;

/// Run find-server command
pub fn run() -> Result<()> {
    let resolver = DependenciesResolver::from_system();
    let found = resolver.try_find_server_executable()?;

    if !found.available {
        return Err(PbiLocateError::ServerExecutableNotFound {
            install_dir: resolver.effective_install_dir()?.display().to_string(),
        });
    }

    println!("{}", found.path.display());
    if found.relocated {
        eprintln!(
            "{}",
            Style::new()
                .dim()
                .apply_to("(using shadow copy from the per-user cache)")
        );
    }

    Ok(())
}
