//! Error types for the auth crate.
//!
//! All auth operations surface errors through [`AuthError`], which is the
//! single error type for this crate. Each variant carries enough context
//! for callers to decide how to handle the failure.

/// Unified error type for the stravactl auth crate.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The authorization code exchange or refresh grant was rejected by
    /// Strava's token endpoint.
    #[error("invalid grant: {reason}")]
    InvalidGrant {
        /// Explanation from the authorization server.
        reason: String,
    },

    /// An HTTP request to Strava's OAuth endpoints failed.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The local callback server timed out waiting for the redirect.
    #[error("callback timed out after {timeout_secs} seconds")]
    CallbackTimeout {
        /// How many seconds we waited before giving up.
        timeout_secs: u64,
    },

    /// The overall authorization flow failed (state mismatch, malformed
    /// callback, user denied access).
    #[error("authorization flow failed: {reason}")]
    FlowFailed {
        /// Details about why the flow failed.
        reason: String,
    },

    /// An error propagated from the token store.
    #[error(transparent)]
    Store(#[from] stravactl_store::StoreError),

    /// JSON serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error (e.g. from the callback TCP listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing error.
    #[error("url parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, AuthError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
