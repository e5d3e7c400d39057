//! Command helper utilities

use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::debug;

use crate::config::Config;
use crate::error::{GdebError, Result};
use crate::git;

/// Global options shared by the repository commands
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub directory: Option<PathBuf>,
    pub upstream_branch: Option<String>,
}

/// Resolve the start directory from the optional argument
///
/// If a directory is provided, use it. Otherwise, resolve to the current
/// directory.
pub fn resolve_start_dir(directory: Option<&Path>) -> Result<PathBuf> {
    match directory {
        Some(path) => Ok(path.to_path_buf()),
        None => std::env::current_dir().map_err(|e| GdebError::IoError {
            message: format!("Failed to get current directory: {e}"),
        }),
    }
}

/// Repository, working-tree root and effective configuration
pub struct Session {
    pub repo: Repository,
    pub root: PathBuf,
    pub config: Config,
}

impl Session {
    /// Discover the repository and load `gdeb.conf`, with CLI overrides applied
    pub fn open(options: &GlobalOptions) -> Result<Self> {
        let start = resolve_start_dir(options.directory.as_deref())?;
        let repo = git::discover(&start)?;
        let root = git::top_level_path(&repo)?;

        let mut config = Config::load(&root)?;
        if let Some(branch) = &options.upstream_branch {
            config.upstream_branch.clone_from(branch);
        }
        debug!(root = %root.display(), ?config, "opened repository");

        Ok(Self { repo, root, config })
    }
}
