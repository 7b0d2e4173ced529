//! Human-readable rendering of API responses.
//!
//! Everything returns a `String` so the render layer stays printable and
//! testable; `main.rs` decides between these and `--json` output.

use stravactl_api::models::{ActivityDetail, ActivitySummary, Athlete, AthleteStats};
use stravactl_api::units;
use stravactl_auth::TokenStatus;

/// Truncate to `max` characters with an ellipsis.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

// ---------------------------------------------------------------------------
// Athlete
// ---------------------------------------------------------------------------

/// Render the athlete profile.
pub fn athlete(a: &Athlete) -> String {
    let mut out = format!("{} (athlete {})\n", a.display_name(), a.id);

    let location: Vec<&str> = [a.city.as_deref(), a.country.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !location.is_empty() {
        out.push_str(&format!("  location:  {}\n", location.join(", ")));
    }
    if let Some(weight) = a.weight {
        out.push_str(&format!("  weight:    {weight:.1} kg\n"));
    }
    if let Some(created) = a.created_at {
        out.push_str(&format!("  member since: {}\n", created.format("%Y-%m-%d")));
    }

    out
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

/// Render the activities table.
pub fn activities(items: &[ActivitySummary]) -> String {
    if items.is_empty() {
        return "no activities found\n".to_string();
    }

    let mut out = format!(
        "{:<12} {:<14} {:<32} {:>9} {:>9} {:>10} {:>7}\n",
        "DATE", "SPORT", "NAME", "DISTANCE", "TIME", "PACE/SPD", "ELEV"
    );

    for a in items {
        out.push_str(&format!(
            "{:<12} {:<14} {:<32} {:>9} {:>9} {:>10} {:>7}\n",
            a.start_local().format("%Y-%m-%d"),
            truncate(a.sport(), 14),
            truncate(&a.name, 32),
            units::format_distance(a.distance),
            units::format_duration(a.moving_time),
            units::format_speed_for_sport(a.sport(), a.average_speed),
            units::format_elevation(a.total_elevation_gain),
        ));
    }

    out
}

/// Render one activity in detail.
pub fn activity_detail(d: &ActivityDetail) -> String {
    let a = &d.summary;
    let mut out = format!("{} ({})\n", a.name, a.sport());

    out.push_str(&format!(
        "  date:       {}\n",
        a.start_local().format("%Y-%m-%d %H:%M")
    ));
    out.push_str(&format!(
        "  distance:   {}\n",
        units::format_distance(a.distance)
    ));
    out.push_str(&format!(
        "  moving:     {}   (elapsed {})\n",
        units::format_duration(a.moving_time),
        units::format_duration(a.elapsed_time)
    ));
    // The detail view has room for both unit systems on rides.
    let pace_or_speed = if units::is_foot_sport(a.sport()) {
        units::format_pace(a.average_speed)
    } else {
        units::format_speed_both(a.average_speed)
    };
    out.push_str(&format!("  pace/speed: {pace_or_speed}\n"));
    out.push_str(&format!(
        "  elevation:  {}\n",
        units::format_elevation(a.total_elevation_gain)
    ));

    if let Some(hr) = a.average_heartrate {
        out.push_str(&format!("  avg hr:     {hr:.0} bpm\n"));
    }
    if let Some(watts) = d.average_watts {
        out.push_str(&format!("  avg power:  {watts:.0} W\n"));
    }
    if let Some(calories) = d.calories {
        out.push_str(&format!("  calories:   {calories:.0}\n"));
    }
    if let Some(ref device) = d.device_name {
        out.push_str(&format!("  device:     {device}\n"));
    }
    if let Some(ref description) = d.description {
        if !description.is_empty() {
            out.push_str(&format!("  notes:      {description}\n"));
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Render the athlete statistics tables.
pub fn stats(s: &AthleteStats) -> String {
    let mut out = String::new();

    let sports = [
        ("Ride", &s.recent_ride_totals, &s.ytd_ride_totals, &s.all_ride_totals),
        ("Run", &s.recent_run_totals, &s.ytd_run_totals, &s.all_run_totals),
        ("Swim", &s.recent_swim_totals, &s.ytd_swim_totals, &s.all_swim_totals),
    ];

    for (sport, recent, ytd, all) in sports {
        // A sport the athlete never does would print three zero rows.
        if all.count == 0 && ytd.count == 0 && recent.count == 0 {
            continue;
        }

        out.push_str(&format!("{sport}\n"));
        out.push_str(&format!(
            "  {:<14} {:>6} {:>12} {:>11} {:>9}\n",
            "WINDOW", "COUNT", "DISTANCE", "TIME", "ELEV"
        ));

        for (window, totals) in [("last 4 weeks", recent), ("year to date", ytd), ("all time", all)]
        {
            out.push_str(&format!(
                "  {:<14} {:>6} {:>12} {:>11} {:>9}\n",
                window,
                totals.count,
                units::format_distance(totals.distance),
                units::format_duration(totals.moving_time),
                units::format_elevation(totals.elevation_gain),
            ));
        }
        out.push('\n');
    }

    if let Some(distance) = s.biggest_ride_distance {
        out.push_str(&format!(
            "biggest ride:  {}\n",
            units::format_distance(distance)
        ));
    }
    if let Some(climb) = s.biggest_climb_elevation_gain {
        out.push_str(&format!(
            "biggest climb: {}\n",
            units::format_elevation(climb)
        ));
    }

    if out.is_empty() {
        out.push_str("no statistics recorded yet\n");
    }

    out
}

// ---------------------------------------------------------------------------
// Auth status
// ---------------------------------------------------------------------------

/// Render the `auth status` report.
pub fn token_status(status: &TokenStatus) -> String {
    let mut out = String::new();

    match status.athlete_id {
        Some(id) => out.push_str(&format!("logged in as athlete {id}\n")),
        None => out.push_str("logged in (athlete id not recorded; re-login to capture it)\n"),
    }

    out.push_str(&format!("  token file: {}\n", status.path.display()));
    out.push_str(&format!(
        "  scopes:     {}\n",
        if status.scope.is_empty() {
            "(none recorded)".to_string()
        } else {
            status.scope.join(", ")
        }
    ));

    let expires = chrono::DateTime::from_timestamp(status.expires_at, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| status.expires_at.to_string());

    if status.expired {
        out.push_str(&format!(
            "  access token: EXPIRED at {expires} (will refresh on next use)\n"
        ));
    } else {
        let minutes = status.expires_in_secs / 60;
        out.push_str(&format!(
            "  access token: valid, expires {expires} (in {minutes} min)\n"
        ));
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use stravactl_api::models::ActivityTotals;

    fn run_activity() -> ActivitySummary {
        serde_json::from_str(
            r#"{
                "id": 1,
                "name": "Morning Run around the lake and back home",
                "sport_type": "Run",
                "distance": 10024.5,
                "moving_time": 2892,
                "elapsed_time": 3080,
                "total_elevation_gain": 123.4,
                "start_date": "2026-08-12T05:02:13Z",
                "start_date_local": "2026-08-12T07:02:13Z",
                "average_speed": 3.466,
                "max_speed": 5.2
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn truncate_short_and_long() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly-10", 10), "exactly-10");
        let long = truncate("a very long activity name indeed", 10);
        assert_eq!(long.chars().count(), 10);
        assert!(long.ends_with('…'));
    }

    #[test]
    fn activities_table_has_header_and_units() {
        let out = activities(&[run_activity()]);
        assert!(out.contains("DATE"));
        assert!(out.contains("2026-08-12"));
        assert!(out.contains("10.02 km"));
        assert!(out.contains("48:12"));
        assert!(out.contains("4:49 /km"));
        assert!(out.contains("123 m"));
    }

    #[test]
    fn activities_empty() {
        assert_eq!(activities(&[]), "no activities found\n");
    }

    #[test]
    fn athlete_profile_renders() {
        let a: Athlete = serde_json::from_str(
            r#"{"id": 7, "firstname": "Jo", "lastname": "Doe", "city": "Boulder", "country": "US", "weight": 61.5}"#,
        )
        .unwrap();
        let out = athlete(&a);
        assert!(out.contains("Jo Doe (athlete 7)"));
        assert!(out.contains("Boulder, US"));
        assert!(out.contains("61.5 kg"));
    }

    #[test]
    fn activity_detail_renders_optional_fields() {
        let d: ActivityDetail = serde_json::from_str(
            r#"{
                "id": 2,
                "name": "Tempo",
                "sport_type": "Run",
                "distance": 8000.0,
                "moving_time": 2100,
                "elapsed_time": 2200,
                "start_date": "2026-08-12T18:00:00Z",
                "average_speed": 3.81,
                "average_heartrate": 162.0,
                "calories": 500.0,
                "description": "felt strong"
            }"#,
        )
        .unwrap();
        let out = activity_detail(&d);
        assert!(out.contains("Tempo (Run)"));
        assert!(out.contains("162 bpm"));
        assert!(out.contains("calories"));
        assert!(out.contains("felt strong"));
    }

    #[test]
    fn activity_detail_shows_ride_speed_in_both_units() {
        let d: ActivityDetail = serde_json::from_str(
            r#"{
                "id": 3,
                "name": "Hill loop",
                "sport_type": "Ride",
                "distance": 40000.0,
                "moving_time": 5882,
                "elapsed_time": 6000,
                "start_date": "2026-08-12T09:00:00Z",
                "average_speed": 6.8
            }"#,
        )
        .unwrap();
        let out = activity_detail(&d);
        assert!(out.contains("24.5 km/h (15.2 mph)"));
    }

    #[test]
    fn stats_skips_unused_sports() {
        let stats_payload = AthleteStats {
            all_run_totals: ActivityTotals {
                count: 250,
                distance: 2_500_000.0,
                moving_time: 750_000,
                elapsed_time: 800_000,
                elevation_gain: 31_000.0,
                achievement_count: None,
            },
            ..Default::default()
        };

        let out = stats(&stats_payload);
        assert!(out.contains("Run"));
        assert!(out.contains("all time"));
        assert!(out.contains("2500.00 km"));
        assert!(!out.contains("Swim"));
        assert!(!out.contains("Ride"));
    }

    #[test]
    fn stats_empty_payload() {
        let out = stats(&AthleteStats::default());
        assert_eq!(out, "no statistics recorded yet\n");
    }

    #[test]
    fn token_status_valid_and_expired() {
        let mut status = TokenStatus {
            path: "/tmp/tokens.json".into(),
            athlete_id: Some(7),
            scope: vec!["read".to_string()],
            expires_at: 1_786_492_800,
            expires_in_secs: 3600,
            expired: false,
        };

        let out = token_status(&status);
        assert!(out.contains("athlete 7"));
        assert!(out.contains("valid"));

        status.expired = true;
        status.expires_in_secs = -10;
        let out = token_status(&status);
        assert!(out.contains("EXPIRED"));
    }
}
