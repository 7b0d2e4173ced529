//! Typed views of Strava API responses.
//!
//! These structs keep only the fields the CLI renders; everything else in
//! Strava's (large) payloads is ignored. Optional and defaulted fields are
//! deliberately tolerant — Strava omits metrics that don't apply to a
//! given sport (no heartrate without a sensor, no elevation for swims).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Athlete
// ---------------------------------------------------------------------------

/// The authenticated athlete, from `GET /athlete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Athlete {
    pub id: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    /// Weight in kilograms.
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Athlete {
    /// Display name: "First Last", falling back to username or the id.
    pub fn display_name(&self) -> String {
        match (&self.firstname, &self.lastname) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            _ => self
                .username
                .clone()
                .unwrap_or_else(|| format!("athlete {}", self.id)),
        }
    }
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

/// One activity from `GET /athlete/activities`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub id: u64,
    pub name: String,

    /// Modern sport type (e.g. "TrailRun", "GravelRide").
    #[serde(default)]
    pub sport_type: Option<String>,

    /// Legacy activity type (e.g. "Run", "Ride"). Strava sends both; we
    /// prefer `sport_type` and keep this as the fallback.
    #[serde(rename = "type", default)]
    pub activity_type: Option<String>,

    /// Distance in meters.
    #[serde(default)]
    pub distance: f64,

    /// Moving time in seconds.
    #[serde(default)]
    pub moving_time: i64,

    /// Elapsed time in seconds.
    #[serde(default)]
    pub elapsed_time: i64,

    /// Total elevation gain in meters.
    #[serde(default)]
    pub total_elevation_gain: f64,

    pub start_date: DateTime<Utc>,

    /// Start time in the athlete's timezone (Strava serializes it with a
    /// `Z` suffix even though it is local wall-clock time).
    #[serde(default)]
    pub start_date_local: Option<DateTime<Utc>>,

    /// Average speed in meters per second.
    #[serde(default)]
    pub average_speed: f64,

    /// Max speed in meters per second.
    #[serde(default)]
    pub max_speed: f64,

    #[serde(default)]
    pub average_heartrate: Option<f64>,

    #[serde(default)]
    pub achievement_count: Option<u32>,
}

impl ActivitySummary {
    /// The sport label to display and filter on.
    pub fn sport(&self) -> &str {
        self.sport_type
            .as_deref()
            .or(self.activity_type.as_deref())
            .unwrap_or("Unknown")
    }

    /// Start time preferred for display (athlete-local when present).
    pub fn start_local(&self) -> DateTime<Utc> {
        self.start_date_local.unwrap_or(self.start_date)
    }
}

/// A detailed activity from `GET /activities/{id}`.
///
/// Superset of the summary fields plus a few detail-only ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDetail {
    #[serde(flatten)]
    pub summary: ActivitySummary,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub calories: Option<f64>,

    #[serde(default)]
    pub device_name: Option<String>,

    #[serde(default)]
    pub average_watts: Option<f64>,
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Aggregated totals for one sport over one window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityTotals {
    #[serde(default)]
    pub count: u64,
    /// Meters.
    #[serde(default)]
    pub distance: f64,
    /// Seconds.
    #[serde(default)]
    pub moving_time: i64,
    /// Seconds.
    #[serde(default)]
    pub elapsed_time: i64,
    /// Meters.
    #[serde(default)]
    pub elevation_gain: f64,
    /// Only present on the recent windows.
    #[serde(default)]
    pub achievement_count: Option<u64>,
}

/// Athlete statistics from `GET /athletes/{id}/stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AthleteStats {
    #[serde(default)]
    pub biggest_ride_distance: Option<f64>,
    #[serde(default)]
    pub biggest_climb_elevation_gain: Option<f64>,

    #[serde(default)]
    pub recent_ride_totals: ActivityTotals,
    #[serde(default)]
    pub recent_run_totals: ActivityTotals,
    #[serde(default)]
    pub recent_swim_totals: ActivityTotals,

    #[serde(default)]
    pub ytd_ride_totals: ActivityTotals,
    #[serde(default)]
    pub ytd_run_totals: ActivityTotals,
    #[serde(default)]
    pub ytd_swim_totals: ActivityTotals,

    #[serde(default)]
    pub all_ride_totals: ActivityTotals,
    #[serde(default)]
    pub all_run_totals: ActivityTotals,
    #[serde(default)]
    pub all_swim_totals: ActivityTotals,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
