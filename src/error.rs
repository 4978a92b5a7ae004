//! Error types shared across the organizer.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a candidate string is not an ISIN
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IsinError {
    /// Not 2 letters + 9 alphanumerics + 1 digit after normalization
    #[error("'{0}' is not shaped like an ISIN")]
    Malformed(String),
    /// Right shape, wrong check digit
    #[error("'{0}' fails the ISIN checksum")]
    Checksum(String),
}

/// Failure to pull text out of a document
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("PDF extraction failed for {path}: {message}")]
    Pdf { path: PathBuf, message: String },
    #[error("PDF extraction panicked for {path} - likely malformed fonts")]
    Panicked { path: PathBuf },
}

/// Errors surfaced by filesystem work and configuration
#[derive(Debug, Error)]
pub enum OrganizerError {
    #[error("failed to {op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl OrganizerError {
    /// Wrap an io error with the operation and path that produced it
    pub fn io(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T, E = OrganizerError> = std::result::Result<T, E>;
