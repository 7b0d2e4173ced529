//! Unit conversion and human formatting.
//!
//! Strava reports distances in meters, times in seconds, and speeds in
//! meters per second. Runners think in pace (min/km), cyclists in km/h.
//! Everything here is a pure function.

/// Meters in a statute mile.
pub const METERS_PER_MILE: f64 = 1609.344;

/// Feet per meter.
pub const FEET_PER_METER: f64 = 3.28084;

/// Sports where pace (min/km) is the natural speed unit.
const FOOT_SPORTS: &[&str] = &[
    "Run",
    "TrailRun",
    "VirtualRun",
    "Walk",
    "Hike",
    "Snowshoe",
];

/// Whether a sport is displayed with pace rather than speed.
pub fn is_foot_sport(sport: &str) -> bool {
    FOOT_SPORTS.contains(&sport)
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Meters to kilometers.
pub fn km(meters: f64) -> f64 {
    meters / 1000.0
}

/// Meters to miles.
pub fn miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

/// Meters to feet.
pub fn feet(meters: f64) -> f64 {
    meters * FEET_PER_METER
}

/// Speed in m/s to km/h.
pub fn kmh(speed_mps: f64) -> f64 {
    speed_mps * 3.6
}

/// Speed in m/s to miles per hour.
pub fn mph(speed_mps: f64) -> f64 {
    speed_mps * 3600.0 / METERS_PER_MILE
}

/// Speed in m/s to seconds per kilometer. `None` for zero or non-finite
/// speeds (a paused treadmill entry must not divide by zero).
pub fn pace_secs_per_km(speed_mps: f64) -> Option<f64> {
    if speed_mps > 0.0 && speed_mps.is_finite() {
        Some(1000.0 / speed_mps)
    } else {
        None
    }
}

/// Speed in m/s to seconds per mile.
pub fn pace_secs_per_mile(speed_mps: f64) -> Option<f64> {
    if speed_mps > 0.0 && speed_mps.is_finite() {
        Some(METERS_PER_MILE / speed_mps)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Format a distance in meters as kilometers: `10.02 km`.
pub fn format_distance(meters: f64) -> String {
    format!("{:.2} km", km(meters))
}

/// Format an elevation gain in meters: `123 m`.
pub fn format_elevation(meters: f64) -> String {
    format!("{:.0} m", meters)
}

/// Format a duration in seconds as `H:MM:SS`, or `MM:SS` under an hour.
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Format a pace as `M:SS /km`, or a dash when speed is zero.
pub fn format_pace(speed_mps: f64) -> String {
    match pace_secs_per_km(speed_mps) {
        Some(secs_per_km) => {
            let total = secs_per_km.round() as i64;
            format!("{}:{:02} /km", total / 60, total % 60)
        }
        None => "-".to_string(),
    }
}

/// Format a speed as `24.5 km/h`, or a dash when zero.
pub fn format_speed(speed_mps: f64) -> String {
    if speed_mps > 0.0 && speed_mps.is_finite() {
        format!("{:.1} km/h", kmh(speed_mps))
    } else {
        "-".to_string()
    }
}

/// Format a speed in both unit systems: `24.5 km/h (15.2 mph)`.
///
/// Used for ride-type sports in the detail view, where cyclists on
/// imperial setups expect mph alongside km/h.
pub fn format_speed_both(speed_mps: f64) -> String {
    if speed_mps > 0.0 && speed_mps.is_finite() {
        format!("{:.1} km/h ({:.1} mph)", kmh(speed_mps), mph(speed_mps))
    } else {
        "-".to_string()
    }
}

/// Pace for foot sports, speed for everything else.
pub fn format_speed_for_sport(sport: &str, speed_mps: f64) -> String {
    if is_foot_sport(sport) {
        format_pace(speed_mps)
    } else {
        format_speed(speed_mps)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
