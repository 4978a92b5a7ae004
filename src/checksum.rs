//! SHA-256 digests used to tell duplicate term sheets apart.

use crate::error::{OrganizerError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Buffer size for reading files (8KB)
const BUFFER_SIZE: usize = 8192;

/// Hex SHA-256 of a file's bytes
pub fn file_sha256(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| OrganizerError::io("open", path, e))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; BUFFER_SIZE];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| OrganizerError::io("read", path, e))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// How a duplicate compares with the copy being kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMatch {
    Identical,
    Different,
    /// One of the files could not be read
    Unknown,
}

/// Compare two files by digest
pub fn compare_files(kept: &Path, other: &Path) -> ContentMatch {
    match (file_sha256(kept), file_sha256(other)) {
        (Ok(a), Ok(b)) if a == b => ContentMatch::Identical,
        (Ok(_), Ok(_)) => ContentMatch::Different,
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "failed to hash duplicate");
            ContentMatch::Unknown
        }
    }
}
