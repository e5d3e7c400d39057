//! Checkout operations for the packaging repository
//!
//! Checkouts use libgit2's safe strategy: files with local modifications
//! are never overwritten, a conflict aborts the checkout instead.

use std::fmt;

use git2::Oid;
use git2::Repository;
use git2::build::CheckoutBuilder;
use tracing::debug;

use crate::error::{GdebError, Result};

/// Where a checkout moves HEAD to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutTarget {
    /// A local branch; HEAD becomes symbolic
    Branch(String),
    /// A commit; HEAD becomes detached
    Commit(Oid),
}

impl fmt::Display for CheckoutTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutTarget::Branch(name) => f.write_str(name),
            CheckoutTarget::Commit(oid) => write!(f, "{oid}"),
        }
    }
}

/// Switch the working tree and HEAD to `target`
pub fn checkout(repo: &Repository, target: &CheckoutTarget) -> Result<()> {
    let fail = |reason: &str| GdebError::Checkout {
        target: target.to_string(),
        reason: reason.to_string(),
    };

    let (commit, refname) = match target {
        CheckoutTarget::Branch(name) => {
            let refname = format!("refs/heads/{name}");
            let commit = repo
                .find_reference(&refname)
                .and_then(|r| r.peel_to_commit())
                .map_err(|e| fail(e.message()))?;
            (commit, Some(refname))
        }
        CheckoutTarget::Commit(oid) => {
            let commit = repo.find_commit(*oid).map_err(|e| fail(e.message()))?;
            (commit, None)
        }
    };

    let mut checkout_builder = CheckoutBuilder::new();
    checkout_builder.safe();

    // Working tree first, so a conflict leaves HEAD untouched
    repo.checkout_tree(commit.as_object(), Some(&mut checkout_builder))
        .map_err(|e| fail(e.message()))?;

    let moved = match refname {
        Some(refname) => repo.set_head(&refname),
        None => repo.set_head_detached(commit.id()),
    };
    moved.map_err(|e| fail(e.message()))?;

    debug!(%target, commit = %commit.id(), "checked out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::refs::current_branch;
    use crate::git::test_support::{commit_files, create_and_switch, init_repo};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_checkout_commit_detaches_head() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(temp.path());
        let first = repo.head().unwrap().peel_to_commit().unwrap().id();
        commit_files(&repo, &[("later", "later\n")], "Second");

        checkout(&repo, &CheckoutTarget::Commit(first)).unwrap();

        assert!(repo.head_detached().unwrap());
        assert!(!temp.path().join("later").exists());
    }

    #[test]
    fn test_checkout_branch_restores_files() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(temp.path());
        let first = repo.head().unwrap().peel_to_commit().unwrap().id();
        create_and_switch(&repo, "feature");
        commit_files(&repo, &[("feature.txt", "x\n")], "Feature work");

        checkout(&repo, &CheckoutTarget::Commit(first)).unwrap();
        checkout(&repo, &CheckoutTarget::Branch("feature".to_string())).unwrap();

        assert_eq!(current_branch(&repo).unwrap(), "feature");
        assert!(temp.path().join("feature.txt").exists());
    }

    #[test]
    fn test_checkout_unknown_branch() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(temp.path());

        let result = checkout(&repo, &CheckoutTarget::Branch("nope".to_string()));
        assert!(matches!(result, Err(GdebError::Checkout { .. })));
        assert_eq!(current_branch(&repo).unwrap(), "master");
    }

    #[test]
    fn test_checkout_conflicting_modification() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(temp.path());
        let first = repo.head().unwrap().peel_to_commit().unwrap().id();
        commit_files(&repo, &[("README", "changed upstream\n")], "Edit README");

        // Uncommitted edit to a file the checkout would have to rewrite
        fs::write(temp.path().join("README"), "local edit\n").unwrap();

        let result = checkout(&repo, &CheckoutTarget::Commit(first));
        assert!(matches!(result, Err(GdebError::Checkout { .. })));
        assert_eq!(current_branch(&repo).unwrap(), "master");
        assert_eq!(
            fs::read_to_string(temp.path().join("README")).unwrap(),
            "local edit\n"
        );
    }

    #[test]
    fn test_target_display() {
        let branch = CheckoutTarget::Branch("feature".to_string());
        assert_eq!(branch.to_string(), "feature");

        let oid = Oid::from_str("0123456789abcdef0123456789abcdef01234567").unwrap();
        let commit = CheckoutTarget::Commit(oid);
        assert_eq!(
            commit.to_string(),
            "0123456789abcdef0123456789abcdef01234567"
        );
    }
}
