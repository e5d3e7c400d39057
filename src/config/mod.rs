//! Configuration file handling for gdeb
//!
//! Settings live in an optional `gdeb.conf` at the repository root. The file
//! is INI-style and only its `[DEFAULT]` section is read:
//!
//! ```ini
//! [DEFAULT]
//! upstream-branch = master
//! debian-branch = debian
//! project-build = make tarball
//! builder = debuild
//! ```
//!
//! Values given on the command line take precedence over the file, which
//! takes precedence over the built-in defaults.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{GdebError, Result};

/// Name of the configuration file at the repository root
pub const CONFIG_FILE: &str = "gdeb.conf";

const DEFAULT_SECTION: &str = "DEFAULT";

pub const DEFAULT_UPSTREAM_BRANCH: &str = "master";
pub const DEFAULT_DEBIAN_BRANCH: &str = "debian";
pub const DEFAULT_PROJECT_BUILD: &str = "make tarball";
pub const DEFAULT_BUILDER: &str = "debuild";

/// Resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Branch holding the pristine upstream history
    pub upstream_branch: String,
    /// Branch holding the packaging; reserved, the tarball workflow does not use it
    pub debian_branch: String,
    /// Project-specific command that writes `../<name>-<version>.*`
    pub project_build: Vec<String>,
    /// Downstream package build command
    pub builder: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream_branch: DEFAULT_UPSTREAM_BRANCH.to_string(),
            debian_branch: DEFAULT_DEBIAN_BRANCH.to_string(),
            project_build: split_command(DEFAULT_PROJECT_BUILD),
            builder: split_command(DEFAULT_BUILDER),
        }
    }
}

fn split_command(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

impl Config {
    /// Load `gdeb.conf` from `root`, falling back to defaults when absent
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content, &path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(GdebError::FileReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Parse configuration text; `path` is only used in messages
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut config = Self::default();
        let mut section: Option<String> = None;

        let parse_error = |line: usize, reason: String| GdebError::ConfigParseFailed {
            path: path.display().to_string(),
            line,
            reason,
        };

        for (index, raw) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[') {
                let name = name.strip_suffix(']').ok_or_else(|| {
                    parse_error(line_no, format!("unterminated section '{line}'"))
                })?;
                section = Some(name.trim().to_string());
                continue;
            }

            let (key, value) = line
                .split_once(['=', ':'])
                .map(|(k, v)| (k.trim(), v.trim()))
                .ok_or_else(|| {
                    parse_error(line_no, format!("expected 'key = value', found '{line}'"))
                })?;

            match section.as_deref() {
                Some(DEFAULT_SECTION) => {}
                Some(other) => {
                    debug!(section = other, key, "ignoring key outside [DEFAULT]");
                    continue;
                }
                None => {
                    return Err(parse_error(
                        line_no,
                        format!("key '{key}' appears before any section header"),
                    ));
                }
            }

            match key {
                "upstream-branch" => {
                    config.upstream_branch = non_empty(value, key, line_no, &parse_error)?;
                }
                "debian-branch" => {
                    config.debian_branch = non_empty(value, key, line_no, &parse_error)?;
                }
                "project-build" => {
                    config.project_build =
                        split_command(&non_empty(value, key, line_no, &parse_error)?);
                }
                "builder" => {
                    config.builder = split_command(&non_empty(value, key, line_no, &parse_error)?);
                }
                _ => warn!(key, path = %path.display(), "unknown configuration key"),
            }
        }

        Ok(config)
    }
}

fn non_empty(
    value: &str,
    key: &str,
    line: usize,
    parse_error: &impl Fn(usize, String) -> GdebError,
) -> Result<String> {
    if value.is_empty() {
        return Err(parse_error(line, format!("'{key}' must not be empty")));
    }
    Ok(value.to_string())
}
