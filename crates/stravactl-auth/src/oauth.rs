//! Strava's OAuth 2.0 authorization code flow.
//!
//! Strava implements RFC 6749 with a few deviations that matter here:
//!
//! - Scopes are comma-separated (`read,activity:read_all`), not
//!   space-separated.
//! - There is no PKCE; the client secret is required on every call to the
//!   token endpoint, including refreshes.
//! - Token responses carry an absolute `expires_at` unix timestamp in
//!   addition to `expires_in`.
//! - The refresh token ROTATES: every refresh response may carry a new
//!   one, and the previous one is invalidated.
//! - The initial code exchange includes a summary `athlete` object;
//!   refresh responses do not.

use serde::Deserialize;
use url::Url;

use stravactl_store::TokenSet;

use crate::error::{AuthError, Result};

/// Strava's authorization endpoint.
pub const AUTHORIZE_URL: &str = "https://www.strava.com/oauth/authorize";

/// Strava's token endpoint (code exchange and refresh).
pub const TOKEN_URL: &str = "https://www.strava.com/oauth/token";

/// Strava's deauthorization endpoint.
pub const DEAUTHORIZE_URL: &str = "https://www.strava.com/oauth/deauthorize";

/// Scopes requested by default: profile read plus full activity history.
pub const DEFAULT_SCOPES: &[&str] = &["read", "activity:read_all"];

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the Strava OAuth flow.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// The Strava application's client ID.
    pub client_id: String,

    /// The Strava application's client secret. Required for every token
    /// endpoint call — Strava has no public-client flow.
    pub client_secret: String,

    /// The redirect URI registered with the Strava application.
    pub redirect_uri: String,

    /// The scopes to request (comma-joined in the authorize URL).
    pub scopes: Vec<String>,

    /// Authorization endpoint. Defaults to [`AUTHORIZE_URL`]; overridable
    /// for tests.
    pub authorize_url: String,

    /// Token endpoint. Defaults to [`TOKEN_URL`]; overridable for tests.
    pub token_url: String,

    /// Deauthorization endpoint. Defaults to [`DEAUTHORIZE_URL`].
    pub deauthorize_url: String,
}

impl OAuthConfig {
    /// Create a config with Strava's production endpoints and the default
    /// scope set.
    pub fn new(client_id: &str, client_secret: &str, redirect_uri: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            redirect_uri: redirect_uri.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            authorize_url: AUTHORIZE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            deauthorize_url: DEAUTHORIZE_URL.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Raw token response from Strava's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    /// Present on the initial code exchange only.
    athlete: Option<AthleteRef>,
}

/// The slice of the athlete summary we keep from the code exchange.
#[derive(Debug, Deserialize)]
struct AthleteRef {
    id: u64,
}

impl TokenResponse {
    /// Convert into a [`TokenSet`], preferring the absolute `expires_at`
    /// and falling back to `now + expires_in`.
    fn into_token_set(self, scope: Vec<String>) -> TokenSet {
        let expires_at = self.expires_at.unwrap_or_else(|| {
            chrono::Utc::now().timestamp() + self.expires_in.unwrap_or(0)
        });

        TokenSet {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            scope,
            athlete_id: self.athlete.map(|a| a.id),
        }
    }
}

/// Error body from the token endpoint, RFC 6749 shape.
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// Error body in Strava's own shape: `{"message": "Bad Request", "errors": [...]}`.
#[derive(Debug, Deserialize)]
struct StravaErrorResponse {
    message: String,
    #[serde(default)]
    errors: Vec<StravaErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct StravaErrorDetail {
    #[serde(default)]
    resource: String,
    #[serde(default)]
    field: String,
    #[serde(default)]
    code: String,
}

// ---------------------------------------------------------------------------
// OAuth flow
// ---------------------------------------------------------------------------

/// Stateless driver for Strava's authorization code flow.
///
/// All state (the CSRF `state`, the authorization code) is passed
/// explicitly via method parameters. Uses `reqwest` for the token
/// endpoint calls.
pub struct OAuthFlow {
    config: OAuthConfig,
    client: reqwest::Client,
}

impl OAuthFlow {
    /// Create a new flow with the given configuration.
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// The configuration this flow was built with.
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Build the authorization URL the user should visit.
    ///
    /// Includes a `state` parameter for CSRF protection and Strava's
    /// comma-joined `scope` list.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UrlParse`] if the configured authorize URL is
    /// not a valid URL.
    pub fn authorization_url(&self, state: &str) -> Result<String> {
        let mut url = Url::parse(&self.config.authorize_url)?;

        {
            let mut params = url.query_pairs_mut();
            params.append_pair("client_id", &self.config.client_id);
            params.append_pair("redirect_uri", &self.config.redirect_uri);
            params.append_pair("response_type", "code");
            params.append_pair("approval_prompt", "auto");
            params.append_pair("state", state);

            if !self.config.scopes.is_empty() {
                // Strava wants commas here, not the usual spaces.
                params.append_pair("scope", &self.config.scopes.join(","));
            }
        }

        Ok(url.to_string())
    }

    /// Exchange an authorization code for tokens.
    ///
    /// `granted_scopes` is the scope list Strava reported on the callback
    /// redirect — the user may have granted less than was requested.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidGrant`] if Strava rejects the code, or
    /// [`AuthError::Network`] on transport failure.
    pub async fn exchange_code(&self, code: &str, granted_scopes: &[String]) -> Result<TokenSet> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ];

        tracing::debug!(token_url = %self.config.token_url, "exchanging authorization code");

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        let tokens = Self::parse_token_response(response, granted_scopes.to_vec()).await?;

        tracing::debug!(
            athlete_id = ?tokens.athlete_id,
            expires_at = tokens.expires_at,
            "code exchange successful"
        );
        Ok(tokens)
    }

    /// Refresh an access token using a refresh token.
    ///
    /// The returned set carries the ROTATED refresh token; the caller must
    /// persist it and re-attach the stored athlete id (refresh responses
    /// carry no athlete object).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidGrant`] if the refresh token is invalid
    /// or was already rotated away.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        tracing::debug!(token_url = %self.config.token_url, "refreshing access token");

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        Self::parse_token_response(response, Vec::new()).await
    }

    /// Revoke the application's access for this athlete.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidGrant`] if Strava rejects the token.
    pub async fn deauthorize(&self, access_token: &str) -> Result<()> {
        let params = [("access_token", access_token)];

        let response = self
            .client
            .post(&self.config.deauthorize_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("application access revoked");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(AuthError::InvalidGrant {
                reason: Self::describe_error_body(status, &body),
            })
        }
    }

    /// Parse the HTTP response from the token endpoint.
    async fn parse_token_response(
        response: reqwest::Response,
        scope: Vec<String>,
    ) -> Result<TokenSet> {
        let status = response.status();

        if status.is_success() {
            let token_response: TokenResponse = response.json().await?;
            Ok(token_response.into_token_set(scope))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(AuthError::InvalidGrant {
                reason: Self::describe_error_body(status, &body),
            })
        }
    }

    /// Turn an error body into a human-readable reason. Strava sometimes
    /// answers in RFC 6749 shape and sometimes in its own `message`/`errors`
    /// shape.
    fn describe_error_body(status: reqwest::StatusCode, body: &str) -> String {
        if let Ok(err) = serde_json::from_str::<OAuthErrorResponse>(body) {
            return err.error_description.unwrap_or(err.error);
        }

        if let Ok(err) = serde_json::from_str::<StravaErrorResponse>(body) {
            let details: Vec<String> = err
                .errors
                .iter()
                .map(|d| format!("{} {} {}", d.resource, d.field, d.code))
                .collect();
            return if details.is_empty() {
                err.message
            } else {
                format!("{}: {}", err.message, details.join(", "))
            };
        }

        format!("HTTP {status}: {body}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
