//! gdeb - Debian orig tarballs from git
//!
//! Builds the pristine upstream archive of a package maintained in git from
//! the merge-base of the packaging branch and the upstream branch, then
//! returns the repository to the branch it started on.

use clap::Parser;
use miette::Diagnostic;

mod archive;
mod cli;
mod commands;
mod config;
mod error;
mod git;
mod hash;
mod logging;
mod metadata;
mod normalize;
mod transaction;

use cli::{Cli, Commands};
use commands::GlobalOptions;
use error::GdebError;

/// Print `err`, its help, and the errors it carries on stderr
fn report_error(err: &GdebError) {
    eprintln!("Error: {err}");
    if let Some(help) = err.help() {
        eprintln!("  help: {help}");
    }
    if let Some(related) = err.related() {
        for cause in related {
            eprintln!("  while handling: {cause}");
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let options = GlobalOptions {
        directory: cli.directory,
        upstream_branch: cli.upstream_branch,
    };

    let result = match cli.command {
        Commands::Tarball(args) => commands::tarball::run(&options, args),
        Commands::Build(args) => commands::build::run(&options, args),
        Commands::Restore => commands::restore::run(&options),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        report_error(&e);
        std::process::exit(e.exit_code());
    }
}
