//! Error types and handling for gdeb
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Every failure of the tarball workflow maps onto one variant. All of them
//! abort the run after the original branch has been restored, except
//! [`GdebError::Restore`], which reports that the restore itself failed.

use miette::Diagnostic;
use thiserror::Error;

/// Exit status for a failed run that left the repository in place
pub const EXIT_FAILURE: i32 = 1;

/// Exit status when the original branch could not be restored
pub const EXIT_RESTORE_FAILED: i32 = 3;

/// Main error type for gdeb operations
#[derive(Error, Diagnostic, Debug)]
pub enum GdebError {
    // Repository errors
    #[error("Not in a git repository: {path}")]
    #[diagnostic(
        code(gdeb::git::not_a_repository),
        help("Run gdeb from inside a git working tree, or pass -C <dir>")
    )]
    NotInGitRepository { path: String },

    #[error("Failed to query repository state ({query}): {reason}")]
    #[diagnostic(code(gdeb::git::state_query))]
    StateQuery { query: String, reason: String },

    #[error("Failed to checkout '{target}': {reason}")]
    #[diagnostic(
        code(gdeb::git::checkout_failed),
        help("Commit or stash local modifications that conflict with the checkout")
    )]
    Checkout { target: String, reason: String },

    #[error("Failed to restore branch '{branch}': {reason}")]
    #[diagnostic(
        code(gdeb::git::restore_failed),
        help("The repository is NOT on '{branch}'. Resolve the problem, then run 'gdeb restore'")
    )]
    Restore {
        branch: String,
        reason: String,
        /// The workflow error that was pending when the restore failed
        #[related]
        interrupted: Vec<GdebError>,
    },

    #[error("Another gdeb run is in progress or was interrupted on branch '{branch}'")]
    #[diagnostic(
        code(gdeb::git::workflow_in_progress),
        help("If no other gdeb process is running, run 'gdeb restore' to return to '{branch}'")
    )]
    WorkflowInProgress { branch: String, marker: String },

    // Packaging metadata errors
    #[error("Packaging metadata not found: {path}")]
    #[diagnostic(
        code(gdeb::metadata::missing),
        help("gdeb must run on a branch that carries a debian/ directory")
    )]
    MissingMetadata { path: String },

    #[error("Failed to parse packaging metadata in {path}: {reason}")]
    #[diagnostic(code(gdeb::metadata::parse_failed))]
    MetadataParse { path: String, reason: String },

    // Archive errors
    #[error("Failed to build upstream archive: {reason}")]
    #[diagnostic(code(gdeb::archive::build_failed))]
    Build { reason: String },

    #[error("No archive matching '{pattern}' in {dir}")]
    #[diagnostic(code(gdeb::archive::not_found))]
    ArtifactNotFound { pattern: String, dir: String },

    #[error("Several archives match '{pattern}': {}", .candidates.join(", "))]
    #[diagnostic(
        code(gdeb::archive::ambiguous),
        help("Remove the stale archives so that exactly one matches")
    )]
    AmbiguousArtifact {
        pattern: String,
        candidates: Vec<String>,
    },

    #[error("Failed to rename '{from}' to '{to}': {reason}")]
    #[diagnostic(code(gdeb::archive::rename_failed))]
    Rename {
        from: String,
        to: String,
        reason: String,
    },

    // Downstream build errors
    #[error("Build command '{command}' exited with status {code}")]
    #[diagnostic(code(gdeb::build::downstream_failed))]
    DownstreamBuildFailed { command: String, code: i32 },

    // Configuration errors
    #[error("Failed to parse configuration file {path} (line {line}): {reason}")]
    #[diagnostic(code(gdeb::config::parse_failed))]
    ConfigParseFailed {
        path: String,
        line: usize,
        reason: String,
    },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(gdeb::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(gdeb::fs::io_error))]
    IoError { message: String },
}

impl GdebError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            GdebError::Restore { .. } => EXIT_RESTORE_FAILED,
            _ => EXIT_FAILURE,
        }
    }

    /// Wrap a restore failure around the error (if any) that the workflow was
    /// about to return, so neither gets lost.
    pub fn restore_failed(
        branch: impl Into<String>,
        cause: GdebError,
        interrupted: Option<GdebError>,
    ) -> Self {
        let reason = match cause {
            GdebError::Checkout { reason, .. } => reason,
            other => other.to_string(),
        };
        GdebError::Restore {
            branch: branch.into(),
            reason,
            interrupted: interrupted.into_iter().collect(),
        }
    }
}

impl From<std::io::Error> for GdebError {
    fn from(err: std::io::Error) -> Self {
        GdebError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<git2::Error> for GdebError {
    fn from(err: git2::Error) -> Self {
        GdebError::StateQuery {
            query: "git".to_string(),
            reason: err.message().to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, GdebError>;
