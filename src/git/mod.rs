//! Git operations on the packaging repository
//!
//! This module handles:
//! - Discovering the repository and its working-tree root
//! - Reading the current branch and the merge-base of two refs
//! - Checking out a branch or a detached commit
//! - Listing the files tracked at HEAD
//!
//! Everything goes through libgit2; the git binary is never spawned.

use std::path::{Path, PathBuf};

use git2::Repository;

use crate::error::{GdebError, Result};

pub mod checkout;
pub mod refs;
pub mod tree;

pub use checkout::{CheckoutTarget, checkout};
pub use refs::{current_branch, merge_base};
pub use tree::{TrackedFile, tracked_files};

/// Open the repository containing `start`
pub fn discover(start: &Path) -> Result<Repository> {
    Repository::discover(start).map_err(|_| GdebError::NotInGitRepository {
        path: start.display().to_string(),
    })
}

/// Root of the working tree, canonicalized
///
/// Bare repositories have no working tree and are rejected.
pub fn top_level_path(repo: &Repository) -> Result<PathBuf> {
    let workdir = repo.workdir().ok_or_else(|| GdebError::StateQuery {
        query: "top-level directory".to_string(),
        reason: "repository has no working tree".to_string(),
    })?;

    dunce::canonicalize(workdir).map_err(|e| GdebError::StateQuery {
        query: "top-level directory".to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Scratch repositories for unit tests

    use std::fs;
    use std::path::Path;

    use git2::{Oid, Repository, Signature};

    /// Write `files` into the working tree and commit them on HEAD
    pub fn commit_files(repo: &Repository, files: &[(&str, &str)], message: &str) -> Oid {
        let root = repo.workdir().unwrap().to_path_buf();
        let mut index = repo.index().unwrap();
        for (path, content) in files {
            let full = root.join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&full, content).unwrap();
            index.add_path(Path::new(path)).unwrap();
        }
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test", "test@test.com").unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    /// Create `name` at HEAD and switch to it
    pub fn create_and_switch(repo: &Repository, name: &str) {
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        repo.branch(name, &head, false).unwrap();
        repo.set_head(&format!("refs/heads/{name}")).unwrap();
    }

    /// Switch to an existing branch, updating the working tree
    pub fn switch(repo: &Repository, name: &str) {
        let refname = format!("refs/heads/{name}");
        let commit = repo
            .find_reference(&refname)
            .unwrap()
            .peel_to_commit()
            .unwrap();
        let mut opts = git2::build::CheckoutBuilder::new();
        opts.force();
        repo.checkout_tree(commit.as_object(), Some(&mut opts))
            .unwrap();
        repo.set_head(&refname).unwrap();
    }

    /// Repository with one commit on `master`
    pub fn init_repo(dir: &Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        repo.set_head("refs/heads/master").unwrap();
        commit_files(&repo, &[("README", "upstream\n")], "Initial commit");
        repo
    }
}
