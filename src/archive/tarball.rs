//! Deterministic tar.gz writer for a git tree
//!
//! Entry content comes from the object database, never the working tree.
//! Ownership, timestamps and ordering are fixed, so the same commit always
//! yields the same bytes.

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::{Compression, GzBuilder};
use git2::Repository;
use tar::{Builder, EntryType, Header};
use tempfile::NamedTempFile;

use crate::error::{GdebError, Result};
use crate::git::TrackedFile;

fn build_error(reason: impl Into<String>) -> GdebError {
    GdebError::Build {
        reason: reason.into(),
    }
}

/// Raw git path bytes as a filesystem path
#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> Result<PathBuf> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    Ok(PathBuf::from(OsStr::from_bytes(bytes)))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> Result<PathBuf> {
    std::str::from_utf8(bytes).map(PathBuf::from).map_err(|_| {
        build_error(format!(
            "'{}' is not valid UTF-8 and cannot be archived on this platform",
            String::from_utf8_lossy(bytes)
        ))
    })
}

/// Fixed metadata applied to every entry
#[derive(Debug, Clone, Copy)]
pub struct EntryStamp {
    /// Modification time, seconds since the epoch
    pub mtime: u64,
}

fn base_header(stamp: EntryStamp, entry_type: EntryType, mode: u32, size: u64) -> Header {
    let mut header = Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_mode(mode);
    header.set_size(size);
    header.set_mtime(stamp.mtime);
    header.set_uid(0);
    header.set_gid(0);
    header
}

fn append_file<W: Write>(
    repo: &Repository,
    builder: &mut Builder<W>,
    prefix: &str,
    file: &TrackedFile,
    stamp: EntryStamp,
) -> Result<()> {
    let blob = repo
        .find_blob(file.blob)
        .map_err(|e| {
            build_error(format!("read '{}': {}", file.display_path(), e.message()))
        })?;
    let data = blob.content();
    let path = Path::new(prefix).join(path_from_bytes(&file.path)?);
    let append_error =
        |e: std::io::Error| build_error(format!("append '{}': {e}", path.display()));

    if file.is_symlink() {
        // Link targets are bytes too
        let target = path_from_bytes(data)?;
        let mut header = base_header(stamp, EntryType::Symlink, 0o777, 0);
        builder
            .append_link(&mut header, &path, &target)
            .map_err(append_error)?;
        return Ok(());
    }

    let mode = if file.is_executable() { 0o755 } else { 0o644 };
    let mut header = base_header(stamp, EntryType::Regular, mode, data.len() as u64);
    builder
        .append_data(&mut header, &path, data)
        .map_err(append_error)?;
    Ok(())
}

/// Write `files` into `dest` as a gzip-compressed tar under `prefix/`
///
/// The archive is assembled in a temporary file beside `dest` and renamed
/// into place once complete, so `dest` never holds a partial archive.
pub fn write_tarball(
    repo: &Repository,
    files: &[TrackedFile],
    prefix: &str,
    stamp: EntryStamp,
    dest: &Path,
) -> Result<()> {
    let dir = dest
        .parent()
        .ok_or_else(|| build_error(format!("'{}' has no parent directory", dest.display())))?;
    let temp = NamedTempFile::new_in(dir)
        .map_err(|e| build_error(format!("create temporary file in {}: {e}", dir.display())))?;

    let encoder = GzBuilder::new()
        .mtime(0)
        .write(temp.as_file(), Compression::default());
    let mut builder = Builder::new(encoder);

    for file in files {
        append_file(repo, &mut builder, prefix, file, stamp)?;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| build_error(format!("finish tar stream: {e}")))?;
    encoder
        .finish()
        .map_err(|e| build_error(format!("finish gzip stream: {e}")))?;

    temp.persist(dest)
        .map_err(|e| build_error(format!("write {}: {}", dest.display(), e.error)))?;
    Ok(())
}
