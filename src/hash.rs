//! BLAKE3 digests of produced archives

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use blake3::Hasher;

use crate::error::{GdebError, Result};

/// Prefix naming the algorithm in printed digests
pub const HASH_PREFIX: &str = "blake3:";

/// Digest of the file at `path`, as `blake3:<hex>`
pub fn hash_file(path: &Path) -> Result<String> {
    let read_failed = |e: std::io::Error| GdebError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let mut reader = BufReader::new(File::open(path).map_err(read_failed)?);
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(read_failed)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{HASH_PREFIX}{}", hasher.finalize().to_hex()))
}
