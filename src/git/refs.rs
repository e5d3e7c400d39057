//! Git reference resolution
//!
//! This module handles:
//! - Finding the branch that is currently checked out
//! - Resolving refs (branches, tags, SHAs) to commits
//! - Computing the merge-base of two refs

use git2::{BranchType, Oid, Repository};
use tracing::debug;

use crate::error::{GdebError, Result};

fn state_query(query: &str, reason: impl Into<String>) -> GdebError {
    GdebError::StateQuery {
        query: query.to_string(),
        reason: reason.into(),
    }
}

/// Name of the local branch marked as checked out
///
/// Fails when HEAD is detached or points at an unborn branch, since there
/// would be nothing to return to afterwards.
pub fn current_branch(repo: &Repository) -> Result<String> {
    let branches = repo
        .branches(Some(BranchType::Local))
        .map_err(|e| state_query("current branch", e.message()))?;

    for entry in branches {
        let (branch, _) = entry.map_err(|e| state_query("current branch", e.message()))?;
        if !branch.is_head() {
            continue;
        }
        let name = branch
            .name()
            .map_err(|e| state_query("current branch", e.message()))?
            .ok_or_else(|| state_query("current branch", "branch name is not valid UTF-8"))?;
        debug!(branch = name, "current branch");
        return Ok(name.to_string());
    }

    Err(state_query(
        "current branch",
        "no branch is checked out (detached HEAD?)",
    ))
}

/// Resolve a reference name to a commit
pub(crate) fn resolve_commit<'r>(repo: &'r Repository, refname: &str) -> Result<git2::Commit<'r>> {
    let ref_candidates = [
        format!("refs/heads/{refname}"),
        format!("refs/tags/{refname}"),
        format!("refs/remotes/origin/{refname}"),
        refname.to_string(),
    ];

    for candidate in &ref_candidates {
        if let Ok(reference) = repo.find_reference(candidate) {
            if let Ok(commit) = reference.peel_to_commit() {
                return Ok(commit);
            }
        }
    }

    if let Ok(obj) = repo.revparse_single(refname) {
        if let Ok(commit) = obj.peel_to_commit() {
            return Ok(commit);
        }
    }

    Err(state_query(
        "resolve reference",
        format!("'{refname}' does not name a commit"),
    ))
}

/// Common ancestor of two refs
pub fn merge_base(repo: &Repository, a: &str, b: &str) -> Result<Oid> {
    let left = resolve_commit(repo, a)?;
    let right = resolve_commit(repo, b)?;

    let base = repo.merge_base(left.id(), right.id()).map_err(|e| {
        state_query(
            "merge-base",
            format!("'{a}' and '{b}' have no common ancestor: {}", e.message()),
        )
    })?;

    debug!(%base, a, b, "merge-base");
    Ok(base)
}
