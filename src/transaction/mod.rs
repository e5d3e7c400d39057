//! Ancestor checkout with guaranteed restore
//!
//! The tarball is built from the merge-base of the current branch and the
//! upstream branch, which means leaving the branch the user is on. This
//! module brackets that excursion: the original branch is checked out again
//! on every exit path, and a failed restore is reported as such instead of
//! being hidden behind whatever error caused the early exit.
//!
//! ## Usage
//!
//! ```ignore
//! let path = with_ancestor_checkout(&repo, "master", |snapshot| {
//!     // Working tree is at snapshot.base here
//!     build_archive(snapshot)
//! })?;
//! // Back on the original branch, whether or not the closure succeeded
//! ```

use std::path::PathBuf;

use git2::{Oid, Repository};
use tracing::{error, info, warn};

use crate::error::{GdebError, Result};
use crate::git::{self, CheckoutTarget};
use crate::metadata::{self, PackageIdentity};

pub mod marker;

pub use marker::RestoreMarker;

/// What the body of an ancestor checkout gets to see
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub identity: PackageIdentity,
    /// Branch that was checked out before, and will be again afterwards
    pub original: String,
    /// Merge-base of `original` and the upstream branch; HEAD while the body runs
    pub base: Oid,
    /// Working-tree root
    pub root: PathBuf,
}

impl Snapshot {
    /// Directory archives are written to and read from: the parent of the working tree
    pub fn output_dir(&self) -> PathBuf {
        self.root
            .parent()
            .map_or_else(|| self.root.clone(), std::path::Path::to_path_buf)
    }
}

/// Returns the repository to its original branch when released or dropped
pub struct RestoreGuard<'r> {
    repo: &'r Repository,
    original: String,
    marker: RestoreMarker,
    released: bool,
}

impl<'r> RestoreGuard<'r> {
    /// Arm the guard before the working tree leaves `original`
    pub fn acquire(repo: &'r Repository, original: &str, base: Oid) -> Result<Self> {
        let marker = RestoreMarker::create(repo, original, base)?;
        Ok(Self {
            repo,
            original: original.to_string(),
            marker,
            released: false,
        })
    }

    fn restore(&self) -> Result<()> {
        git::checkout(self.repo, &CheckoutTarget::Branch(self.original.clone()))?;
        if let Err(e) = self.marker.remove() {
            warn!(
                marker = %self.marker.path().display(),
                error = %e,
                "restored branch but could not remove restore marker"
            );
        }
        Ok(())
    }

    /// Check out the original branch, then hand back `outcome`
    ///
    /// If the checkout fails, the result is [`GdebError::Restore`] carrying
    /// the error `outcome` held, if any. The marker is kept in that case.
    pub fn release<T>(mut self, outcome: Result<T>) -> Result<T> {
        self.released = true;
        match self.restore() {
            Ok(()) => {
                info!(branch = %self.original, "restored original branch");
                outcome
            }
            Err(cause) => Err(GdebError::restore_failed(
                &self.original,
                cause,
                outcome.err(),
            )),
        }
    }
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        // Only reached when the body unwound past release()
        match self.restore() {
            Ok(()) => warn!(branch = %self.original, "restored original branch after abort"),
            Err(e) => error!(
                branch = %self.original,
                error = %e,
                "failed to restore original branch; run 'gdeb restore'"
            ),
        }
    }
}

/// Run `body` with the working tree at the merge-base of the current branch
/// and `upstream`, then return to the current branch
pub fn with_ancestor_checkout<T, F>(repo: &Repository, upstream: &str, body: F) -> Result<T>
where
    F: FnOnce(&Snapshot) -> Result<T>,
{
    let root = git::top_level_path(repo)?;
    if !metadata::control_file_exists(&root) {
        return Err(GdebError::MissingMetadata {
            path: root.join("debian/control").display().to_string(),
        });
    }
    let identity = PackageIdentity::resolve(&root)?;

    let original = git::current_branch(repo)?;
    let base = git::merge_base(repo, &original, upstream)?;
    info!(
        package = %identity.name,
        version = %identity.upstream_version,
        %original,
        upstream,
        %base,
        "checking out upstream merge-base"
    );

    let guard = RestoreGuard::acquire(repo, &original, base)?;
    let snapshot = Snapshot {
        identity,
        original,
        base,
        root,
    };

    let outcome =
        git::checkout(repo, &CheckoutTarget::Commit(base)).and_then(|()| body(&snapshot));
    guard.release(outcome)
}

/// Return to the branch recorded by a leftover restore marker
///
/// Returns the branch name, or `None` when there was nothing to restore.
pub fn restore_interrupted(repo: &Repository) -> Result<Option<String>> {
    let Some(marker) = RestoreMarker::load(repo)? else {
        return Ok(None);
    };

    git::checkout(repo, &CheckoutTarget::Branch(marker.branch.clone()))
        .map_err(|e| GdebError::restore_failed(&marker.branch, e, None))?;
    marker.remove()?;

    info!(branch = %marker.branch, "restored interrupted run");
    Ok(Some(marker.branch))
}
