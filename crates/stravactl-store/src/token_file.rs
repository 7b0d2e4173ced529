//! Atomic JSON file storage for the Strava token set.
//!
//! A single user owns a single token set, so the store is a plain JSON
//! file rather than a database. Writes are atomic: the new contents are
//! written to a temp file in the same directory, permissions are tightened
//! to 0600, and the temp file is renamed over the destination. A reader
//! never observes a half-written file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Environment variable that overrides the default token file location.
pub const TOKEN_FILE_ENV: &str = "STRAVA_TOKEN_FILE";

/// Safety margin in seconds: a token this close to expiry is treated as
/// expired so it never runs out mid-request.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

// ---------------------------------------------------------------------------
// Token set
// ---------------------------------------------------------------------------

/// The persisted OAuth credentials for the single Strava account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Bearer token used to authenticate API requests.
    pub access_token: String,

    /// Refresh token used to obtain new access tokens. Strava rotates this
    /// on every refresh, so the stored value must always be the latest.
    pub refresh_token: String,

    /// Unix timestamp (seconds) when the access token expires.
    pub expires_at: i64,

    /// The scopes the user actually granted (e.g. `activity:read_all`).
    #[serde(default)]
    pub scope: Vec<String>,

    /// The authenticated athlete's id, captured from the initial code
    /// exchange. Refresh responses do not include it.
    #[serde(default)]
    pub athlete_id: Option<u64>,
}

impl TokenSet {
    /// Whether the access token is expired (with a 60-second margin).
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at - EXPIRY_MARGIN_SECS
    }

    /// Seconds until the token expires; negative if already past.
    pub fn expires_in_secs(&self) -> i64 {
        self.expires_at - chrono::Utc::now().timestamp()
    }
}

// ---------------------------------------------------------------------------
// Token store
// ---------------------------------------------------------------------------

/// File-backed store for a [`TokenSet`].
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at the default location.
    ///
    /// Honors the `STRAVA_TOKEN_FILE` environment variable; otherwise uses
    /// `~/.config/stravactl/tokens.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoHomeDir`] if no override is set and the home
    /// directory cannot be determined.
    pub fn at_default_path() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    /// Resolve the default token file path.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(TOKEN_FILE_ENV)
            && !path.is_empty()
        {
            return Ok(PathBuf::from(path));
        }

        let home = home::home_dir().ok_or(StoreError::NoHomeDir)?;
        Ok(home.join(".config").join("stravactl").join("tokens.json"))
    }

    /// The path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the token set from disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotLoggedIn`] if the file does not exist and
    /// [`StoreError::Corrupt`] if it exists but is not valid JSON.
    pub fn load(&self) -> Result<TokenSet> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotLoggedIn {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Persist the token set atomically.
    ///
    /// Parent directories are created on demand. The file is written with
    /// mode 0600 on unix — token files must never be world-readable.
    pub fn save(&self, tokens: &TokenSet) -> Result<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let json = serde_json::to_string_pretty(tokens)?;

        // Write to a temp file in the same directory so the final rename
        // stays on one filesystem and is atomic.
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        use std::io::Write;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.flush()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tmp.as_file().set_permissions(perms)?;
        }

        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        tracing::debug!(path = %self.path.display(), "token file written");
        Ok(())
    }

    /// Delete the token file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotLoggedIn`] if there was no file to delete.
    pub fn delete(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "token file deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotLoggedIn {
                    path: self.path.clone(),
                })
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Whether a token file currently exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
