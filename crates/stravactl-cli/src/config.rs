//! Environment configuration for the CLI.
//!
//! Credentials come from the environment (a `.env` file is loaded by
//! `main` via dotenvy before this runs). The Strava application's client
//! id and secret are both required — Strava has no public-client flow.

use anyhow::{Context, Result, bail};

use stravactl_auth::{OAuthConfig, OAuthFlow, TokenManager};
use stravactl_store::TokenStore;

/// Environment variable for the Strava application's client id.
pub const CLIENT_ID_ENV: &str = "STRAVA_CLIENT_ID";

/// Environment variable for the Strava application's client secret.
pub const CLIENT_SECRET_ENV: &str = "STRAVA_CLIENT_SECRET";

/// Environment variable overriding the local callback port.
pub const REDIRECT_PORT_ENV: &str = "STRAVA_REDIRECT_PORT";

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_port: u16,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through a lookup function (testable without
    /// mutating the process environment).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let client_id = match lookup(CLIENT_ID_ENV) {
            Some(v) if !v.is_empty() => v,
            _ => bail!(
                "missing {CLIENT_ID_ENV}: create a Strava API application at \
                 https://www.strava.com/settings/api and export {CLIENT_ID_ENV} \
                 and {CLIENT_SECRET_ENV} (or put them in a .env file)"
            ),
        };

        let client_secret = match lookup(CLIENT_SECRET_ENV) {
            Some(v) if !v.is_empty() => v,
            _ => bail!("missing {CLIENT_SECRET_ENV}: export it alongside {CLIENT_ID_ENV}"),
        };

        let redirect_port = match lookup(REDIRECT_PORT_ENV) {
            Some(v) if !v.is_empty() => v
                .parse()
                .with_context(|| format!("{REDIRECT_PORT_ENV} is not a valid port: {v}"))?,
            _ => stravactl_auth::DEFAULT_CALLBACK_PORT,
        };

        Ok(Self {
            client_id,
            client_secret,
            redirect_port,
        })
    }

    /// The redirect URI matching the callback server.
    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}/callback", self.redirect_port)
    }

    /// Build the token manager this configuration describes.
    pub fn token_manager(&self) -> Result<TokenManager> {
        let store = TokenStore::at_default_path().context("resolving token file path")?;
        let oauth = OAuthConfig::new(&self.client_id, &self.client_secret, &self.redirect_uri());
        Ok(TokenManager::new(store, OAuthFlow::new(oauth)).with_callback_port(self.redirect_port))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
