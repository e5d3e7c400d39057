//! CLI definitions using clap derive API
//!
//! Argument types for the larger commands live in submodules:
//! - tarball: Tarball command arguments
//! - build: Build command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod build;
pub mod completions;
pub mod tarball;

pub use build::BuildArgs;
pub use completions::CompletionsArgs;
pub use tarball::TarballArgs;

/// gdeb - orig tarballs from git
///
/// Build the pristine upstream archive of a Debian package kept in git.
#[derive(Parser, Debug)]
#[command(
    name = "gdeb",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Build Debian orig tarballs from the upstream merge-base",
    long_about = "gdeb checks out the merge-base of the current branch and the upstream branch, \
                  builds the upstream archive there, renames it to <name>_<version>.orig.<ext> \
                  next to the working tree, and returns to the current branch.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  gdeb tarball                    \x1b[90m# Write ../<name>_<version>.orig.tar.gz\x1b[0m\n   \
                  gdeb -u upstream tarball        \x1b[90m# Use another upstream branch\x1b[0m\n   \
                  gdeb build -- -us -uc           \x1b[90m# Tarball, then debuild -us -uc\x1b[0m\n   \
                  gdeb restore                    \x1b[90m# Return to the branch of an interrupted run\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Start repository discovery here (defaults to current directory)
    #[arg(long, short = 'C', global = true, env = "GDEB_DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Upstream branch (overrides upstream-branch in gdeb.conf)
    #[arg(long, short = 'u', global = true, value_name = "BRANCH")]
    pub upstream_branch: Option<String>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the orig tarball from the upstream merge-base
    Tarball(TarballArgs),

    /// Build the orig tarball, then run the package builder
    Build(BuildArgs),

    /// Return to the original branch after an interrupted run
    Restore,

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
