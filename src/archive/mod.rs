//! Upstream archive creation
//!
//! Two strategies, tried in order:
//! - [`BuildVariant::ProjectBuild`]: the project's own tarball command
//!   (`make tarball` unless configured otherwise)
//! - [`BuildVariant::GenericArchive`]: a deterministic tar.gz of the files
//!   tracked at HEAD, minus the packaging directory
//!
//! The second runs only when the first fails, and only its failure is an
//! error.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use git2::Repository;
use tracing::{debug, info};

use crate::error::{GdebError, Result};
use crate::git;
use crate::metadata::{PACKAGING_DIR, PackageIdentity};

pub mod tarball;

pub use tarball::{EntryStamp, write_tarball};

/// Which strategy produced the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildVariant {
    ProjectBuild,
    GenericArchive,
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildVariant::ProjectBuild => f.write_str("project build"),
            BuildVariant::GenericArchive => f.write_str("generic archive"),
        }
    }
}

/// Produces `<output_dir>/<name>-<version>.*` from the checked-out commit
pub struct ArchiveBuilder<'r> {
    repo: &'r Repository,
    root: PathBuf,
    output_dir: PathBuf,
    project_build: Vec<String>,
}

impl<'r> ArchiveBuilder<'r> {
    pub fn new(
        repo: &'r Repository,
        root: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        project_build: Vec<String>,
    ) -> Self {
        Self {
            repo,
            root: root.into(),
            output_dir: output_dir.into(),
            project_build,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run the project build, falling back to the generic archive
    pub fn build(&self, identity: &PackageIdentity) -> Result<BuildVariant> {
        if self.run_project_build() {
            return Ok(BuildVariant::ProjectBuild);
        }

        let path = self.generic_archive(identity)?;
        info!(path = %path.display(), "wrote generic archive");
        Ok(BuildVariant::GenericArchive)
    }

    /// True when the project build command ran and exited successfully
    fn run_project_build(&self) -> bool {
        let Some((program, args)) = self.project_build.split_first() else {
            debug!("no project build command configured");
            return false;
        };
        let command = self.project_build.join(" ");

        match Command::new(program)
            .args(args)
            .current_dir(&self.root)
            .output()
        {
            Ok(output) if output.status.success() => {
                debug!(
                    %command,
                    stdout = %String::from_utf8_lossy(&output.stdout).trim(),
                    "project build output"
                );
                info!(%command, "project build succeeded");
                true
            }
            Ok(output) => {
                debug!(
                    %command,
                    status = %output.status,
                    stdout = %String::from_utf8_lossy(&output.stdout).trim(),
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "project build failed"
                );
                info!(%command, "project build unavailable, using generic archive");
                false
            }
            Err(e) => {
                debug!(%command, error = %e, "project build could not be started");
                info!(%command, "project build unavailable, using generic archive");
                false
            }
        }
    }

    /// Archive the tracked files at HEAD into `<output_dir>/<name>-<version>.tar.gz`
    pub fn generic_archive(&self, identity: &PackageIdentity) -> Result<PathBuf> {
        let as_build_error = |e: GdebError| GdebError::Build {
            reason: e.to_string(),
        };

        let files: Vec<git::TrackedFile> = git::tracked_files(self.repo)
            .map_err(as_build_error)?
            .into_iter()
            .filter(|file| !is_packaging_path(&file.path))
            .collect();

        let commit = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| GdebError::Build {
                reason: format!("resolve HEAD: {}", e.message()),
            })?;
        let stamp = EntryStamp {
            mtime: u64::try_from(commit.time().seconds()).unwrap_or(0),
        };

        let stem = identity.archive_stem();
        let dest = self.output_dir.join(format!("{stem}.tar.gz"));
        debug!(
            files = files.len(),
            commit = %commit.id(),
            dest = %dest.display(),
            "writing generic archive"
        );
        write_tarball(self.repo, &files, &stem, stamp, &dest)?;
        Ok(dest)
    }
}

fn is_packaging_path(path: &[u8]) -> bool {
    path.strip_prefix(PACKAGING_DIR.as_bytes())
        .is_some_and(|rest| rest.first() == Some(&b'/'))
}
