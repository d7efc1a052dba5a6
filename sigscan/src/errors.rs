//! Error types for pattern loading and scanning.
//!
//! Pattern-table errors are fatal: a scan never starts without a valid
//! table. Per-file read errors are not: they are isolated into that
//! file's report so one unreadable file cannot abort the rest of the
//! scan.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while loading patterns or scanning files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Malformed pattern record at line {line}: {reason} ({record:?})")]
    MalformedRecord {
        line: usize,
        record: String,
        reason: String,
    },
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ScanError {
    pub fn malformed_record(
        line: usize,
        record: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedRecord {
            line,
            record: record.into(),
            reason: reason.into(),
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Self::NotADirectory(path.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Maps an IO error from reading `path` onto the scan error taxonomy.
    pub fn from_read_error(path: &std::path::Path, e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(e),
        }
    }
}
