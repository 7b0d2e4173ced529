//! CLI argument definitions for stravactl.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use clap::{ArgAction, Parser, Subcommand};

/// stravactl -- Strava activity history and athlete stats from the terminal.
#[derive(Parser)]
#[command(
    name = "stravactl",
    version,
    about = "Query Strava activity history and athlete stats",
    long_about = "A single-account Strava integration: authorize once in the browser, then \
                  query activities and statistics from the terminal. Requires a Strava API \
                  application (STRAVA_CLIENT_ID / STRAVA_CLIENT_SECRET)."
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the OAuth session with Strava.
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Show the authenticated athlete's profile.
    Athlete {
        /// Print the raw API response as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List recent activities, newest first.
    Activities {
        /// Maximum number of activities to fetch (paginates as needed).
        #[arg(long, short, default_value_t = 30)]
        limit: usize,

        /// Page size per API request (Strava caps this at 200).
        #[arg(long, default_value_t = 30)]
        per_page: u32,

        /// Only activities after this date (YYYY-MM-DD or epoch seconds).
        #[arg(long)]
        after: Option<String>,

        /// Only activities before this date (YYYY-MM-DD or epoch seconds).
        #[arg(long)]
        before: Option<String>,

        /// Only activities of this sport type (e.g. Run, Ride, TrailRun).
        #[arg(long)]
        sport: Option<String>,

        /// Print the activities as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show one activity in detail.
    Activity {
        /// The activity id.
        id: u64,

        /// Print the raw API response as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show aggregated athlete statistics (recent / year-to-date / all-time).
    Stats {
        /// Print the raw API response as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Actions for managing the OAuth session.
#[derive(Subcommand)]
pub enum AuthAction {
    /// Authorize with Strava in the browser and store tokens locally.
    Login {
        /// Print the authorization URL instead of opening a browser.
        #[arg(long)]
        no_browser: bool,
    },

    /// Force a token refresh now.
    Refresh,

    /// Show the stored session (athlete id, scopes, expiry).
    Status,

    /// Delete the stored tokens.
    Logout {
        /// Also revoke the application's access with Strava.
        #[arg(long)]
        deauthorize: bool,
    },
}

/// Parse a `--before`/`--after` value: epoch seconds, or `YYYY-MM-DD`.
///
/// Dates are taken as UTC. `end_of_day` makes `--before 2026-08-12`
/// include the whole named day.
pub fn parse_date_bound(value: &str, end_of_day: bool) -> anyhow::Result<i64> {
    if let Ok(epoch) = value.parse::<i64>() {
        return Ok(epoch);
    }

    let date = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        anyhow::anyhow!("invalid date '{value}': expected YYYY-MM-DD or epoch seconds")
    })?;

    let time = if end_of_day {
        chrono::NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default()
    } else {
        chrono::NaiveTime::default()
    };

    Ok(date.and_time(time).and_utc().timestamp())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_date_bound_epoch_passthrough() {
        assert_eq!(parse_date_bound("1700000000", false).unwrap(), 1700000000);
    }

    #[test]
    fn parse_date_bound_start_of_day() {
        // 2026-08-12T00:00:00Z
        assert_eq!(parse_date_bound("2026-08-12", false).unwrap(), 1786492800);
    }

    #[test]
    fn parse_date_bound_end_of_day_includes_whole_day() {
        let start = parse_date_bound("2026-08-12", false).unwrap();
        let end = parse_date_bound("2026-08-12", true).unwrap();
        assert_eq!(end - start, 86399);
    }

    #[test]
    fn parse_date_bound_rejects_garbage() {
        let err = parse_date_bound("yesterday", false).unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn activities_flags_parse() {
        let cli = Cli::parse_from([
            "stravactl",
            "activities",
            "--limit",
            "50",
            "--sport",
            "Run",
            "--after",
            "2026-01-01",
        ]);
        match cli.command {
            Commands::Activities {
                limit,
                sport,
                after,
                json,
                ..
            } => {
                assert_eq!(limit, 50);
                assert_eq!(sport.as_deref(), Some("Run"));
                assert_eq!(after.as_deref(), Some("2026-01-01"));
                assert!(!json);
            }
            _ => panic!("expected activities subcommand"),
        }
    }

    #[test]
    fn auth_login_flags_parse() {
        let cli = Cli::parse_from(["stravactl", "auth", "login", "--no-browser"]);
        match cli.command {
            Commands::Auth {
                action: AuthAction::Login { no_browser },
            } => assert!(no_browser),
            _ => panic!("expected auth login subcommand"),
        }
    }
}
