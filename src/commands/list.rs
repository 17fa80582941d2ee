//! List command implementation
//!
//! This command lists every installation candidate the three channels produce,
//! before selection. Useful for diagnosing why a given install was (or was not)
//! picked.

use console::Style;

use crate::cli::ListArgs;
use crate::error::Result;
use crate::locator::Locator;

/// Run list command
pub fn run(args: ListArgs) -> Result<()> {
    let records = Locator::from_system().enumerate();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No Power BI Desktop installations found.");
        return Ok(());
    }

    println!("Discovered installations ({}):", records.len());
    println!();

    for record in &records {
        println!(
            "  {}",
            Style::new()
                .bold()
                .yellow()
                .apply_to(record.install_dir.display())
        );
        println!(
            "    {} {}  {} {}  {} {}",
            Style::new().bold().apply_to("channel:"),
            record.channel,
            Style::new().bold().apply_to("version:"),
            record.product_version,
            Style::new().bold().apply_to("arch:"),
            if record.is_64bit { "x64" } else { "x86" }
        );
        println!();
    }

    Ok(())
}
