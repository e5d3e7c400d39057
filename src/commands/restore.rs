//! Restore command implementation

use console::Style;

use crate::error::Result;
use crate::transaction;

use super::helpers::{GlobalOptions, resolve_start_dir};

/// Run restore command
pub fn run(options: &GlobalOptions) -> Result<()> {
    let start = resolve_start_dir(options.directory.as_deref())?;
    let repo = crate::git::discover(&start)?;

    match transaction::restore_interrupted(&repo)? {
        Some(branch) => println!(
            "Restored branch {}",
            Style::new().bold().yellow().apply_to(branch)
        ),
        None => println!("Nothing to restore."),
    }

    Ok(())
}
