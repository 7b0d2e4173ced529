//! Error types for the API client crate.

/// Unified error type for the stravactl API client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request was rejected with 401 even after a forced token refresh.
    #[error("unauthorized: Strava rejected the access token after a refresh; run `stravactl auth login`")]
    Unauthorized,

    /// Strava's rate limit was hit (HTTP 429).
    #[error("rate limited: Strava's {window} limit is exhausted, retry later")]
    RateLimited {
        /// Which window was exhausted ("15-minute" or "daily").
        window: &'static str,
    },

    /// Strava answered with a non-success status.
    #[error("Strava API returned {status}: {message}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The message from the response body, if any.
        message: String,
    },

    /// A response body could not be decoded into the expected shape.
    #[error("failed to decode Strava response for {endpoint}: {source}")]
    Decode {
        /// Which endpoint produced the body.
        endpoint: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An error propagated from the auth crate (token refresh, store).
    #[error(transparent)]
    Auth(#[from] stravactl_auth::AuthError),

    /// An HTTP request failed at the transport level.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, ApiError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
