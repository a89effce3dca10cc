//! Error types for `PerunDB`.
//!
//! This module provides a unified error type for all `PerunDB` operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for `PerunDB` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `PerunDB` operations.
///
/// Each variant includes a descriptive error message suitable for end-users.
/// Error codes follow the pattern `PERUN-XXX` for easy debugging.
#[derive(Error, Debug)]
pub enum Error {
    /// Dimension mismatch (PERUN-001).
    #[error("[PERUN-001] Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Invalid argument (PERUN-002).
    #[error("[PERUN-002] Invalid argument: {0}")]
    InvalidArgument(String),

    /// Point not found (PERUN-003).
    ///
    /// The external ID is out of range or refers to a deleted slot.
    #[error("[PERUN-003] Point with ID '{0}' not found")]
    PointNotFound(u64),

    /// Key not found (PERUN-004).
    #[error("[PERUN-004] Key '{0}' not found")]
    KeyNotFound(String),

    /// Index file missing (PERUN-005).
    #[error("[PERUN-005] Index file missing: {}", .0.display())]
    MissingFile(PathBuf),

    /// Index corrupted (PERUN-006).
    ///
    /// Indicates that index files are inconsistent and cannot be opened.
    #[error("[PERUN-006] Index corrupted: {0}")]
    Corrupted(String),

    /// IO error (PERUN-007).
    #[error("[PERUN-007] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error (PERUN-008).
    #[error("[PERUN-008] Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (PERUN-009).
    #[error("[PERUN-009] Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns the error code (e.g., "PERUN-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DimensionMismatch { .. } => "PERUN-001",
            Self::InvalidArgument(_) => "PERUN-002",
            Self::PointNotFound(_) => "PERUN-003",
            Self::KeyNotFound(_) => "PERUN-004",
            Self::MissingFile(_) => "PERUN-005",
            Self::Corrupted(_) => "PERUN-006",
            Self::Io(_) => "PERUN-007",
            Self::Serialization(_) => "PERUN-008",
            Self::Config(_) => "PERUN-009",
        }
    }

    /// Returns true if this error is recoverable at the call site.
    ///
    /// Argument and lookup errors leave the index untouched. IO and
    /// corruption errors are fatal to the index instance.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. }
                | Self::InvalidArgument(_)
                | Self::PointNotFound(_)
                | Self::KeyNotFound(_)
                | Self::Config(_)
        )
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
