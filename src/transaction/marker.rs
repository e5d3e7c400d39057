//! Restore marker
//!
//! `<git-dir>/gdeb-restore` records the branch to return to while the
//! working tree sits on the ancestor commit. It is created with create-new
//! semantics, so it also keeps a second gdeb run out of the same
//! repository. A marker left behind by a killed process or a failed restore
//! is what `gdeb restore` works from.
//!
//! Format:
//!
//! ```text
//! branch feature
//! base 1f0c...
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use git2::{Oid, Repository};
use tracing::warn;

use crate::error::{GdebError, Result};

const MARKER_FILE: &str = "gdeb-restore";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreMarker {
    path: PathBuf,
    pub branch: String,
    pub base: Option<Oid>,
}

/// Location of the marker for `repo`
pub fn marker_path(repo: &Repository) -> PathBuf {
    repo.path().join(MARKER_FILE)
}

fn parse(path: &Path, content: &str) -> Result<RestoreMarker> {
    let invalid = |reason: &str| GdebError::StateQuery {
        query: format!("restore marker {}", path.display()),
        reason: reason.to_string(),
    };

    let mut branch = None;
    let mut base = None;
    for line in content.lines() {
        match line.split_once(' ') {
            Some(("branch", value)) if !value.trim().is_empty() => {
                branch = Some(value.trim().to_string());
            }
            Some(("base", value)) => {
                base = Some(Oid::from_str(value.trim()).map_err(|e| invalid(e.message()))?);
            }
            _ => {}
        }
    }

    Ok(RestoreMarker {
        path: path.to_path_buf(),
        branch: branch.ok_or_else(|| invalid("no branch recorded"))?,
        base,
    })
}

/// Remove a marker whose content could not be written completely
///
/// A truncated marker would otherwise block every later run, including
/// `gdeb restore`, with an unreadable-marker error.
fn discard_partial(path: &Path, written: io::Result<()>) -> Result<()> {
    let Err(e) = written else {
        return Ok(());
    };
    if let Err(remove) = fs::remove_file(path) {
        warn!(
            marker = %path.display(),
            error = %remove,
            "could not remove partially written restore marker"
        );
    }
    Err(e.into())
}

impl RestoreMarker {
    /// Record `branch` and `base`, failing if a marker already exists
    pub fn create(repo: &Repository, branch: &str, base: Oid) -> Result<Self> {
        let path = marker_path(repo);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let branch = Self::load(repo)?
                    .map_or_else(|| "unknown".to_string(), |marker| marker.branch);
                return Err(GdebError::WorkflowInProgress {
                    branch,
                    marker: path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let written = writeln!(file, "branch {branch}")
            .and_then(|()| writeln!(file, "base {base}"))
            .and_then(|()| file.sync_all());
        discard_partial(&path, written)?;

        Ok(Self {
            path,
            branch: branch.to_string(),
            base: Some(base),
        })
    }

    /// Read a leftover marker, if there is one
    pub fn load(repo: &Repository) -> Result<Option<Self>> {
        let path = marker_path(repo);
        match fs::read_to_string(&path) {
            Ok(content) => parse(&path, &content).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GdebError::FileReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the marker; a marker that is already gone is fine
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
