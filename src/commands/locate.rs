//! Locate command implementation
//!
//! Runs discovery and selection, and reports the one installation every other
//! command would use.

use console::Style;

use crate::error::Result;
use crate::resolver::DependenciesResolver;

/// Run locate command
pub fn run() -> Result<()> {
    let resolver = DependenciesResolver::from_system();
    let record = resolver.selected_installation()?;

    let display_dir =
        dunce::canonicalize(&record.install_dir).unwrap_or_else(|_| record.install_dir.clone());

    println!(
        "{}",
        Style::new().bold().yellow().apply_to(display_dir.display())
    );
    println!(
        "  {} {}",
        Style::new().bold().apply_to("Channel:"),
        record.channel
    );
    println!(
        "  {} {}",
        Style::new().bold().apply_to("Version:"),
        record.product_version
    );
    println!(
        "  {} {}",
        Style::new().bold().apply_to("Arch:"),
        if record.is_64bit { "x64" } else { "x86" }
    );

    Ok(())
}
