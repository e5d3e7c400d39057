//! Tarball command implementation
//!
//! Builds the upstream archive at the merge-base of the current branch and
//! the upstream branch, renames it to its orig tarball name, and reports
//! where it went.

use console::Style;
use std::path::PathBuf;

use git2::Repository;
use tracing::info;

use crate::archive::{ArchiveBuilder, BuildVariant};
use crate::cli::TarballArgs;
use crate::config::Config;
use crate::error::Result;
use crate::hash;
use crate::metadata::PackageIdentity;
use crate::normalize::{self, OverwritePolicy};
use crate::transaction;

use super::helpers::{GlobalOptions, Session};

/// What a tarball run produced
#[derive(Debug, Clone)]
pub struct TarballOutcome {
    pub identity: PackageIdentity,
    pub variant: BuildVariant,
    /// Normalized `<name>_<version>.orig.<ext>` path
    pub path: PathBuf,
}

/// Run tarball command
pub fn run(options: &GlobalOptions, args: TarballArgs) -> Result<()> {
    let session = Session::open(options)?;
    let outcome = create(
        &session.repo,
        &session.config,
        OverwritePolicy::from_flag(args.overwrite),
    )?;
    report(&outcome)
}

/// Build and normalize the orig tarball, always returning to the current branch
pub fn create(
    repo: &Repository,
    config: &Config,
    policy: OverwritePolicy,
) -> Result<TarballOutcome> {
    transaction::with_ancestor_checkout(repo, &config.upstream_branch, |snapshot| {
        let output_dir = snapshot.output_dir();
        let builder = ArchiveBuilder::new(
            repo,
            &snapshot.root,
            &output_dir,
            config.project_build.clone(),
        );

        let variant = builder.build(&snapshot.identity)?;
        let path = normalize::normalize(builder.output_dir(), &snapshot.identity, policy)?;
        info!(path = %path.display(), %variant, base = %snapshot.base, "orig tarball ready");

        Ok(TarballOutcome {
            identity: snapshot.identity.clone(),
            variant,
            path,
        })
    })
}

/// Print the outcome summary
pub fn report(outcome: &TarballOutcome) -> Result<()> {
    let digest = hash::hash_file(&outcome.path)?;

    println!("{}", outcome.path.display());
    println!(
        "  {} {} {}",
        Style::new().bold().apply_to("Package:"),
        Style::new().bold().yellow().apply_to(&outcome.identity.name),
        outcome.identity.upstream_version
    );
    println!(
        "  {} {}",
        Style::new().bold().apply_to("Built by:"),
        Style::new().cyan().apply_to(outcome.variant)
    );
    println!(
        "  {} {}",
        Style::new().bold().apply_to("Digest:"),
        Style::new().dim().apply_to(digest)
    );

    Ok(())
}
