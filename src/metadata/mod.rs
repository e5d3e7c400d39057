//! Packaging metadata from the `debian/` directory
//!
//! Only two fields matter here: the source package name and the version of
//! the topmost `debian/changelog` entry. Both come from the entry header:
//!
//! ```text
//! foo (1.2-3) unstable; urgency=medium
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::error::{GdebError, Result};

/// Directory holding the packaging metadata, relative to the repository root
pub const PACKAGING_DIR: &str = "debian";

const CONTROL_FILE: &str = "debian/control";
const CHANGELOG_FILE: &str = "debian/changelog";

/// Separator between the upstream version and the Debian revision
const REVISION_SEPARATOR: char = '-';

/// True when `debian/control` exists under `root`
pub fn control_file_exists(root: &Path) -> bool {
    root.join(CONTROL_FILE).is_file()
}

/// Header fields of the topmost changelog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    /// The `Source` field
    pub source: String,
    /// The full `Version` field, including any Debian revision
    pub version: String,
}

/// Read the topmost entry of `debian/changelog`
pub fn read_changelog(root: &Path) -> Result<ChangelogEntry> {
    let path = root.join(CHANGELOG_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(GdebError::MissingMetadata {
                path: path.display().to_string(),
            });
        }
        Err(e) => {
            return Err(GdebError::FileReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            });
        }
    };

    parse_changelog_header(&content).map_err(|reason| GdebError::MetadataParse {
        path: path.display().to_string(),
        reason,
    })
}

fn parse_changelog_header(content: &str) -> std::result::Result<ChangelogEntry, String> {
    let header = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| "changelog is empty".to_string())?;

    if header.starts_with(char::is_whitespace) {
        return Err(format!("expected an entry header, found '{}'", header.trim()));
    }

    let (source, rest) = header
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("malformed entry header '{header}'"))?;

    let rest = rest.trim_start();
    let version = rest
        .strip_prefix('(')
        .and_then(|r| r.split_once(')'))
        .map(|(version, _)| version.trim())
        .ok_or_else(|| format!("missing '(version)' in entry header '{header}'"))?;

    if version.is_empty() {
        return Err("version is empty".to_string());
    }

    Ok(ChangelogEntry {
        source: source.to_string(),
        version: version.to_string(),
    })
}

/// Upstream part of a Debian version: everything before the first `-`
///
/// The full version is split at most once, so `1.2-3-4` yields `1.2`.
pub fn upstream_version(full: &str) -> std::result::Result<String, String> {
    let mut parts = full.splitn(2, REVISION_SEPARATOR);
    let upstream = parts.next().unwrap_or_default();

    if upstream.is_empty() {
        return Err(format!("version '{full}' has no upstream part"));
    }

    Ok(upstream.to_string())
}

/// Name and upstream version of the package being built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIdentity {
    pub name: String,
    pub upstream_version: String,
}

impl PackageIdentity {
    pub fn new(name: impl Into<String>, upstream_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            upstream_version: upstream_version.into(),
        }
    }

    /// Read the identity from the packaging metadata under `root`
    pub fn resolve(root: &Path) -> Result<Self> {
        let entry = read_changelog(root)?;
        let upstream =
            upstream_version(&entry.version).map_err(|reason| GdebError::MetadataParse {
                path: root.join(CHANGELOG_FILE).display().to_string(),
                reason,
            })?;

        debug!(
            name = %entry.source,
            version = %entry.version,
            upstream = %upstream,
            "package identity"
        );
        Ok(Self::new(entry.source, upstream))
    }

    /// `<name>-<version>`, the stem produced archives are expected to use
    pub fn archive_stem(&self) -> String {
        format!("{}-{}", self.name, self.upstream_version)
    }

    /// `<name>_<version>.orig`, the stem of the normalized archive
    pub fn orig_stem(&self) -> String {
        format!("{}_{}.orig", self.name, self.upstream_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_debian(root: &Path, changelog: &str) {
        fs::create_dir_all(root.join("debian")).unwrap();
        fs::write(root.join(CONTROL_FILE), "Source: foo\n").unwrap();
        fs::write(root.join(CHANGELOG_FILE), changelog).unwrap();
    }

    #[test]
    fn test_upstream_version_with_revision() {
        assert_eq!(upstream_version("1.2-3").unwrap(), "1.2");
    }

    #[test]
    fn test_upstream_version_native() {
        assert_eq!(upstream_version("1.2").unwrap(), "1.2");
    }

    #[test]
    fn test_upstream_version_splits_once() {
        assert_eq!(upstream_version("1.2-rc1-3").unwrap(), "1.2");
        assert_eq!(upstream_version("2.0--1").unwrap(), "2.0");
    }

    #[test]
    fn test_upstream_version_keeps_epoch() {
        assert_eq!(upstream_version("1:2.0-1").unwrap(), "1:2.0");
    }

    #[test]
    fn test_upstream_version_empty() {
        assert!(upstream_version("").is_err());
        assert!(upstream_version("-3").is_err());
    }

    #[test]
    fn test_parse_changelog_header() {
        let entry = parse_changelog_header(
            "foo (1.2-3) unstable; urgency=medium\n\n  * Initial release.\n",
        )
        .unwrap();
        assert_eq!(entry.source, "foo");
        assert_eq!(entry.version, "1.2-3");
    }

    #[test]
    fn test_parse_changelog_skips_leading_blank_lines() {
        let entry = parse_changelog_header("\n\nbar (0.9) experimental; urgency=low\n").unwrap();
        assert_eq!(entry.source, "bar");
        assert_eq!(entry.version, "0.9");
    }

    #[test]
    fn test_parse_changelog_malformed() {
        assert!(parse_changelog_header("").is_err());
        assert!(parse_changelog_header("foo 1.2-3 unstable").is_err());
        assert!(parse_changelog_header("foo () unstable; urgency=low").is_err());
        assert!(parse_changelog_header("  * not a header").is_err());
    }

    #[test]
    fn test_control_file_exists() {
        let temp = TempDir::new().unwrap();
        assert!(!control_file_exists(temp.path()));

        write_debian(temp.path(), "foo (1.0-1) unstable; urgency=low\n");
        assert!(control_file_exists(temp.path()));
    }

    #[test]
    fn test_resolve_identity() {
        let temp = TempDir::new().unwrap();
        write_debian(temp.path(), "foo (1.2-3) unstable; urgency=medium\n");

        let identity = PackageIdentity::resolve(temp.path()).unwrap();
        assert_eq!(identity, PackageIdentity::new("foo", "1.2"));
        assert_eq!(identity.archive_stem(), "foo-1.2");
        assert_eq!(identity.orig_stem(), "foo_1.2.orig");
    }

    #[test]
    fn test_resolve_missing_changelog() {
        let temp = TempDir::new().unwrap();
        let result = PackageIdentity::resolve(temp.path());
        assert!(matches!(result, Err(GdebError::MissingMetadata { .. })));
    }

    #[test]
    fn test_resolve_bad_version() {
        let temp = TempDir::new().unwrap();
        write_debian(temp.path(), "foo (-1) unstable; urgency=medium\n");

        let result = PackageIdentity::resolve(temp.path());
        assert!(matches!(result, Err(GdebError::MetadataParse { .. })));
    }
}
