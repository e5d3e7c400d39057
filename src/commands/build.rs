//! Build command implementation
//!
//! Produces the orig tarball, then hands over to the package builder
//! (`debuild` unless configured otherwise) in the working-tree root.

use std::path::Path;
use std::process::Command;

use tracing::info;

use crate::cli::BuildArgs;
use crate::error::{GdebError, Result};
use crate::normalize::OverwritePolicy;

use super::helpers::{GlobalOptions, Session};
use super::tarball;

/// Run build command
pub fn run(options: &GlobalOptions, args: BuildArgs) -> Result<()> {
    let session = Session::open(options)?;
    let outcome = tarball::create(
        &session.repo,
        &session.config,
        OverwritePolicy::from_flag(args.overwrite),
    )?;
    tarball::report(&outcome)?;

    run_builder(&session.config.builder, &args.args, &session.root)
}

/// Run `builder` followed by `extra` in `root`, with inherited stdio
pub fn run_builder(builder: &[String], extra: &[String], root: &Path) -> Result<()> {
    let Some((program, builder_args)) = builder.split_first() else {
        return Err(GdebError::IoError {
            message: "No builder command configured".to_string(),
        });
    };
    let command = builder
        .iter()
        .chain(extra)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    info!(%command, "running package builder");

    let status = Command::new(program)
        .args(builder_args)
        .args(extra)
        .current_dir(root)
        .status()
        .map_err(|e| GdebError::IoError {
            message: format!("Failed to run '{command}': {e}"),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(GdebError::DownstreamBuildFailed {
            command,
            // Killed by a signal
            code: status.code().unwrap_or(-1),
        })
    }
}
