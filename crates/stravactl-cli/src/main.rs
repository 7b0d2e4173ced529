//! CLI entry point for stravactl.
//!
//! This binary provides the `stravactl` command with subcommands for
//! authorizing with Strava and querying activities and statistics.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use stravactl_api::{ActivityFilter, StravaClient};
use stravactl_auth::TokenManager;

mod cli;
mod config;
mod render;

use cli::{AuthAction, Cli, Commands, parse_date_bound};
use config::Config;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // A .env next to the working directory is the common setup for skills.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::from_env()?;
    let manager = config.token_manager()?;

    match cli.command {
        Commands::Auth { action } => cmd_auth(manager, action).await,
        Commands::Athlete { json } => cmd_athlete(StravaClient::new(manager), json).await,
        Commands::Activities {
            limit,
            per_page,
            after,
            before,
            sport,
            json,
        } => {
            cmd_activities(
                StravaClient::new(manager),
                limit,
                per_page,
                after,
                before,
                sport,
                json,
            )
            .await
        }
        Commands::Activity { id, json } => cmd_activity(StravaClient::new(manager), id, json).await,
        Commands::Stats { json } => cmd_stats(StravaClient::new(manager), json).await,
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` wins when set.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Quiet by default; each `-v` opens up one level.
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

// ---------------------------------------------------------------------------
// Subcommand: auth
// ---------------------------------------------------------------------------

async fn cmd_auth(manager: TokenManager, action: AuthAction) -> Result<()> {
    match action {
        AuthAction::Login { no_browser } => {
            let tokens = manager
                .login(|url| {
                    println!("Open this URL to authorize stravactl with Strava:\n");
                    println!("  {url}\n");
                    if !no_browser && open::that(url).is_err() {
                        tracing::warn!("could not open a browser; use the URL above");
                    }
                })
                .await
                .context("authorization flow failed")?;

            match tokens.athlete_id {
                Some(id) => println!("logged in as athlete {id}"),
                None => println!("logged in"),
            }
            if !tokens.scope.is_empty() {
                println!("granted scopes: {}", tokens.scope.join(", "));
            }
            Ok(())
        }

        AuthAction::Refresh => {
            let tokens = manager.force_refresh().await.context("token refresh failed")?;
            let expires = chrono::DateTime::from_timestamp(tokens.expires_at, 0)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| tokens.expires_at.to_string());
            println!("token refreshed, expires {expires}");
            Ok(())
        }

        AuthAction::Status => {
            let status = manager.status()?;
            print!("{}", render::token_status(&status));
            Ok(())
        }

        AuthAction::Logout { deauthorize } => {
            let deauthorized = manager.logout(deauthorize).await?;
            if deauthorize && !deauthorized {
                println!("local tokens deleted (remote deauthorization failed, see log)");
            } else if deauthorized {
                println!("application access revoked and local tokens deleted");
            } else {
                println!("local tokens deleted");
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Subcommand: athlete
// ---------------------------------------------------------------------------

async fn cmd_athlete(client: StravaClient, json: bool) -> Result<()> {
    if json {
        let raw = client.get_raw("/athlete", &[]).await?;
        println!("{}", serde_json::to_string_pretty(&raw)?);
    } else {
        let athlete = client.athlete().await?;
        print!("{}", render::athlete(&athlete));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: activities
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
async fn cmd_activities(
    client: StravaClient,
    limit: usize,
    per_page: u32,
    after: Option<String>,
    before: Option<String>,
    sport: Option<String>,
    json: bool,
) -> Result<()> {
    let filter = ActivityFilter {
        // --before includes the whole named day; --after starts at midnight.
        before: before.as_deref().map(|v| parse_date_bound(v, true)).transpose()?,
        after: after.as_deref().map(|v| parse_date_bound(v, false)).transpose()?,
    };

    if json {
        // Raw passthrough: the API response untouched, like the other
        // subcommands' --json mode.
        let mut values = client.recent_activities_raw(limit, per_page, filter).await?;
        if let Some(ref sport) = sport {
            values.retain(|v| raw_sport(v).is_some_and(|s| s.eq_ignore_ascii_case(sport)));
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::Value::Array(values))?
        );
    } else {
        let mut activities = client.recent_activities(limit, per_page, filter).await?;
        if let Some(ref sport) = sport {
            activities.retain(|a| a.sport().eq_ignore_ascii_case(sport));
        }
        print!("{}", render::activities(&activities));
    }
    Ok(())
}

/// The sport of a raw activity object, preferring the modern `sport_type`
/// key over the legacy `type`.
fn raw_sport(activity: &serde_json::Value) -> Option<&str> {
    activity
        .get("sport_type")
        .or_else(|| activity.get("type"))
        .and_then(serde_json::Value::as_str)
}

// ---------------------------------------------------------------------------
// Subcommand: activity
// ---------------------------------------------------------------------------

async fn cmd_activity(client: StravaClient, id: u64, json: bool) -> Result<()> {
    if json {
        let raw = client.get_raw(&format!("/activities/{id}"), &[]).await?;
        println!("{}", serde_json::to_string_pretty(&raw)?);
    } else {
        let detail = client.activity(id).await?;
        print!("{}", render::activity_detail(&detail));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: stats
// ---------------------------------------------------------------------------

async fn cmd_stats(client: StravaClient, json: bool) -> Result<()> {
    let athlete_id = client
        .auth()
        .store()
        .load()?
        .athlete_id
        .ok_or_else(|| {
            anyhow!("stored tokens carry no athlete id; run `stravactl auth login` once to capture it")
        })?;

    if json {
        let raw = client
            .get_raw(&format!("/athletes/{athlete_id}/stats"), &[])
            .await?;
        println!("{}", serde_json::to_string_pretty(&raw)?);
    } else {
        let stats = client.athlete_stats(athlete_id).await?;
        print!("{}", render::stats(&stats));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
