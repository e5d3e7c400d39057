//! Tracked files at HEAD
//!
//! Paths are kept as the raw bytes git stores, since git places no encoding
//! requirement on file names.

use git2::{FileMode, ObjectType, Oid, Repository, Tree};

use crate::error::{GdebError, Result};

/// A blob or symlink recorded in the HEAD tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    /// Slash-separated path relative to the repository root, as stored by git
    pub path: Vec<u8>,
    pub mode: FileMode,
    pub blob: Oid,
}

impl TrackedFile {
    pub fn is_executable(&self) -> bool {
        self.mode == FileMode::BlobExecutable
    }

    pub fn is_symlink(&self) -> bool {
        self.mode == FileMode::Link
    }

    /// Path for messages; invalid UTF-8 is replaced
    pub fn display_path(&self) -> String {
        String::from_utf8_lossy(&self.path).into_owned()
    }
}

fn file_mode(raw: i32) -> Option<FileMode> {
    match raw {
        m if m == i32::from(FileMode::Blob) => Some(FileMode::Blob),
        m if m == i32::from(FileMode::BlobExecutable) => Some(FileMode::BlobExecutable),
        m if m == i32::from(FileMode::Link) => Some(FileMode::Link),
        _ => None,
    }
}

fn tree_error(e: &git2::Error) -> GdebError {
    GdebError::StateQuery {
        query: "tracked files".to_string(),
        reason: e.message().to_string(),
    }
}

fn collect(
    repo: &Repository,
    tree: &Tree<'_>,
    prefix: &[u8],
    files: &mut Vec<TrackedFile>,
) -> Result<()> {
    for entry in tree {
        let mut path = prefix.to_vec();
        path.extend_from_slice(entry.name_bytes());

        match entry.kind() {
            Some(ObjectType::Tree) => {
                let subtree = repo.find_tree(entry.id()).map_err(|e| tree_error(&e))?;
                path.push(b'/');
                collect(repo, &subtree, &path, files)?;
            }
            Some(ObjectType::Blob) => {
                if let Some(mode) = file_mode(entry.filemode()) {
                    files.push(TrackedFile {
                        path,
                        mode,
                        blob: entry.id(),
                    });
                }
            }
            // Gitlinks
            _ => {}
        }
    }
    Ok(())
}

/// Every file in the tree of the commit HEAD points to, in tree order
///
/// Gitlinks (submodules) are skipped: their content lives in another
/// repository.
pub fn tracked_files(repo: &Repository) -> Result<Vec<TrackedFile>> {
    let tree = repo
        .head()
        .and_then(|head| head.peel_to_tree())
        .map_err(|e| tree_error(&e))?;

    let mut files = Vec::new();
    collect(repo, &tree, b"", &mut files)?;
    Ok(files)
}
