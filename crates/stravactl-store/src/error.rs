//! Error types for the token store crate.
//!
//! All store operations surface errors through [`StoreError`], the single
//! error type for this crate.

use std::path::PathBuf;

/// Unified error type for the stravactl token store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No token file exists — the user has never logged in (or logged out).
    #[error("not logged in: no token file at {path}")]
    NotLoggedIn {
        /// Where the token file was expected.
        path: PathBuf,
    },

    /// The token file exists but could not be parsed.
    #[error("corrupt token file at {path}: {source}")]
    Corrupt {
        /// The file that failed to parse.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The home directory could not be determined for the default path.
    #[error("cannot determine home directory for token file location")]
    NoHomeDir,

    /// JSON serialization error while writing tokens.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error reading or writing the token file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
