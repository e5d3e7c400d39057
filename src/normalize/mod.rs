//! Orig tarball naming
//!
//! Finds the single `<name>-<version>.*` archive in the output directory and
//! renames it to `<name>_<version>.orig.<ext>`, the name dpkg-source looks
//! for.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use wax::{CandidatePath, Glob, Pattern};

use crate::error::{GdebError, Result};
use crate::metadata::PackageIdentity;

/// What to do when the normalized name is already taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Keep the existing orig tarball and fail
    #[default]
    Forbid,
    /// Replace the existing orig tarball
    Replace,
}

impl OverwritePolicy {
    /// Policy for the `--overwrite` flag
    pub fn from_flag(overwrite: bool) -> Self {
        if overwrite {
            OverwritePolicy::Replace
        } else {
            OverwritePolicy::Forbid
        }
    }
}

/// Archive extension of a file name
///
/// The last dot-separated component, or the last two when the one before
/// is `tar`: `foo-1.2.tar.gz` gives `tar.gz`, `foo-1.2.tgz` gives `tgz`.
pub fn archive_extension(file_name: &str) -> Option<String> {
    let mut components = file_name.rsplit('.');
    let last = components.next()?;
    let penultimate = components.next()?;

    if last.is_empty() {
        return None;
    }
    if penultimate == "tar" && components.next().is_some() {
        return Some(format!("tar.{last}"));
    }
    Some(last.to_string())
}

/// Glob expression matching `<name>-<version>.*` for `identity`
pub fn artifact_pattern(identity: &PackageIdentity) -> String {
    format!("{}.*", wax::escape(&identity.archive_stem()))
}

/// The single regular file in `dir` matching the identity's archive pattern
pub fn find_artifact(dir: &Path, identity: &PackageIdentity) -> Result<PathBuf> {
    let expression = artifact_pattern(identity);
    let display_pattern = format!("{}.*", identity.archive_stem());
    let glob = Glob::new(&expression).map_err(|e| GdebError::ArtifactNotFound {
        pattern: display_pattern.clone(),
        dir: format!("{} ({e})", dir.display()),
    })?;

    let entries = fs::read_dir(dir).map_err(|e| GdebError::FileReadFailed {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut matches: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if glob.matched(&CandidatePath::from(file_name)).is_some() {
            matches.push(entry.path());
        }
    }
    matches.sort();
    debug!(pattern = %display_pattern, candidates = matches.len(), "artifact search");

    match matches.len() {
        0 => Err(GdebError::ArtifactNotFound {
            pattern: display_pattern,
            dir: dir.display().to_string(),
        }),
        1 => Ok(matches.remove(0)),
        _ => Err(GdebError::AmbiguousArtifact {
            pattern: display_pattern,
            candidates: matches
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
        }),
    }
}

/// Rename the produced archive in `dir` to its orig tarball name
pub fn normalize(
    dir: &Path,
    identity: &PackageIdentity,
    policy: OverwritePolicy,
) -> Result<PathBuf> {
    let artifact = find_artifact(dir, identity)?;
    let file_name = artifact
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let extension = archive_extension(file_name).ok_or_else(|| GdebError::ArtifactNotFound {
        pattern: format!("{}.*", identity.archive_stem()),
        dir: format!("{} ('{file_name}' has no archive extension)", dir.display()),
    })?;

    let target = dir.join(format!("{}.{extension}", identity.orig_stem()));
    let rename_error = |reason: String| GdebError::Rename {
        from: artifact.display().to_string(),
        to: target.display().to_string(),
        reason,
    };

    if target.exists() {
        match policy {
            OverwritePolicy::Forbid => {
                return Err(rename_error(
                    "destination already exists (use --overwrite to replace it)".to_string(),
                ));
            }
            OverwritePolicy::Replace => {
                info!(path = %target.display(), "replacing existing orig tarball");
            }
        }
    }

    fs::rename(&artifact, &target).map_err(|e| rename_error(e.to_string()))?;
    debug!(from = %artifact.display(), to = %target.display(), "renamed archive");
    Ok(target)
}
