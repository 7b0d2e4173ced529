//! Strava API client for stravactl.
//!
//! Typed access to the handful of Strava v3 endpoints the CLI needs:
//! the authenticated athlete, athlete statistics, and the activity list
//! with pagination. Unit conversion (m/s to pace, meters to km) lives in
//! [`units`].
//!
//! Authentication is delegated to [`stravactl_auth::TokenManager`]: every
//! request uses a token that is refreshed on demand, and a 401 triggers
//! one forced refresh and retry.

pub mod client;
pub mod error;
pub mod models;
pub mod units;

// Re-export key types at the crate root for convenience.
pub use client::{ActivityFilter, DEFAULT_PER_PAGE, MAX_PER_PAGE, StravaClient};
pub use error::ApiError;
pub use models::{ActivityDetail, ActivitySummary, ActivityTotals, Athlete, AthleteStats};
