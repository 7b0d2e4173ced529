//! Strava REST API client.
//!
//! Thin typed wrapper over `https://www.strava.com/api/v3`. Every request
//! is authenticated with a bearer token from the [`TokenManager`], which
//! refreshes expired tokens on demand. A 401 response triggers exactly one
//! forced refresh and retry; a second 401 surfaces as
//! [`ApiError::Unauthorized`].

use serde::de::DeserializeOwned;

use stravactl_auth::TokenManager;

use crate::error::{ApiError, Result};
use crate::models::{ActivityDetail, ActivitySummary, Athlete, AthleteStats};

/// Strava API base URL.
pub const API_BASE_URL: &str = "https://www.strava.com/api/v3";

/// Strava's default page size for list endpoints.
pub const DEFAULT_PER_PAGE: u32 = 30;

/// Strava's maximum page size for list endpoints.
pub const MAX_PER_PAGE: u32 = 200;

/// Optional epoch-second bounds for the activities list.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityFilter {
    /// Only activities starting before this unix timestamp.
    pub before: Option<i64>,
    /// Only activities starting after this unix timestamp.
    pub after: Option<i64>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Authenticated Strava API client.
pub struct StravaClient {
    http: reqwest::Client,
    auth: TokenManager,
    base_url: String,
}

impl StravaClient {
    /// Create a client over the given token manager.
    pub fn new(auth: TokenManager) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("stravactl/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            http,
            auth,
            base_url: API_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL (tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// The token manager backing this client.
    pub fn auth(&self) -> &TokenManager {
        &self.auth
    }

    // -----------------------------------------------------------------------
    // Endpoints
    // -----------------------------------------------------------------------

    /// The authenticated athlete.
    pub async fn athlete(&self) -> Result<Athlete> {
        self.get("/athlete", &[]).await
    }

    /// Aggregated statistics for an athlete.
    pub async fn athlete_stats(&self, athlete_id: u64) -> Result<AthleteStats> {
        self.get(&format!("/athletes/{athlete_id}/stats"), &[]).await
    }

    /// One page of the athlete's activities, newest first.
    ///
    /// `per_page` is clamped to Strava's maximum of 200.
    pub async fn activities_page(
        &self,
        page: u32,
        per_page: u32,
        filter: ActivityFilter,
    ) -> Result<Vec<ActivitySummary>> {
        let query = activity_query(page, per_page, filter);
        self.get("/athlete/activities", &query).await
    }

    /// Up to `limit` recent activities, paginating as needed.
    ///
    /// Requests successive pages until the limit is reached or a short page
    /// signals the end of the athlete's history.
    pub async fn recent_activities(
        &self,
        limit: usize,
        per_page: u32,
        filter: ActivityFilter,
    ) -> Result<Vec<ActivitySummary>> {
        self.collect_activities(limit, per_page, filter).await
    }

    /// Like [`recent_activities`](Self::recent_activities), but returns the
    /// raw JSON objects untouched. Backs the CLI's `--json` mode, which
    /// passes the API response through without dropping unmapped fields.
    pub async fn recent_activities_raw(
        &self,
        limit: usize,
        per_page: u32,
        filter: ActivityFilter,
    ) -> Result<Vec<serde_json::Value>> {
        self.collect_activities(limit, per_page, filter).await
    }

    async fn collect_activities<T: DeserializeOwned>(
        &self,
        limit: usize,
        per_page: u32,
        filter: ActivityFilter,
    ) -> Result<Vec<T>> {
        let mut collected = Vec::new();
        if limit == 0 {
            return Ok(collected);
        }

        let per_page = clamp_per_page(per_page);
        let mut page = 1;

        loop {
            let query = activity_query(page, per_page, filter);
            let batch: Vec<T> = self.get("/athlete/activities", &query).await?;
            let batch_len = batch.len();
            collected.extend(batch);

            tracing::debug!(page, batch_len, total = collected.len(), "fetched activity page");

            // A short page means there is nothing further back.
            if collected.len() >= limit || batch_len < per_page as usize {
                break;
            }
            page += 1;
        }

        collected.truncate(limit);
        Ok(collected)
    }

    /// A single activity with detail fields.
    pub async fn activity(&self, id: u64) -> Result<ActivityDetail> {
        self.get(&format!("/activities/{id}"), &[]).await
    }

    /// Fetch any GET endpoint as raw JSON (the CLI's `--json` mode).
    pub async fn get_raw(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<serde_json::Value> {
        self.get(path, query).await
    }

    // -----------------------------------------------------------------------
    // HTTP plumbing
    // -----------------------------------------------------------------------

    /// GET a path and decode the JSON response, refreshing the token and
    /// retrying once on 401.
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(String, String)]) -> Result<T> {
        let token = self.auth.access_token().await?;
        let response = self.send(path, query, &token).await?;

        let response = if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!(path, "got 401, forcing a token refresh and retrying once");
            let refreshed = self.auth.force_refresh().await?;
            let retry = self.send(path, query, &refreshed.access_token).await?;
            if retry.status() == reqwest::StatusCode::UNAUTHORIZED {
                return Err(ApiError::Unauthorized);
            }
            retry
        } else {
            response
        };

        self.decode(path, response).await
    }

    /// Issue one GET request.
    async fn send(
        &self,
        path: &str,
        query: &[(String, String)],
        token: &str,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;
        Ok(response)
    }

    /// Check status and rate limits, then decode the body.
    async fn decode<T: DeserializeOwned>(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let usage = rate_limit_header(response.headers(), "x-ratelimit-usage");
        let limit = rate_limit_header(response.headers(), "x-ratelimit-limit");

        if let (Some((used_15m, _)), Some((limit_15m, _))) = (usage, limit)
            && limit_15m.saturating_sub(used_15m) <= 5
        {
            tracing::warn!(
                used = used_15m,
                limit = limit_15m,
                "Strava 15-minute rate limit nearly exhausted"
            );
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let window = match (usage, limit) {
                (Some((used_15m, _)), Some((limit_15m, _))) if used_15m >= limit_15m => {
                    "15-minute"
                }
                _ => "daily",
            };
            return Err(ApiError::RateLimited { window });
        }

        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or(body);
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            endpoint: path.to_string(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Clamp a page size into Strava's accepted range.
fn clamp_per_page(per_page: u32) -> u32 {
    per_page.clamp(1, MAX_PER_PAGE)
}

/// Build the query string for the activities list endpoint.
fn activity_query(page: u32, per_page: u32, filter: ActivityFilter) -> Vec<(String, String)> {
    let mut query = vec![
        ("page".to_string(), page.to_string()),
        ("per_page".to_string(), clamp_per_page(per_page).to_string()),
    ];
    if let Some(before) = filter.before {
        query.push(("before".to_string(), before.to_string()));
    }
    if let Some(after) = filter.after {
        query.push(("after".to_string(), after.to_string()));
    }
    query
}

/// Parse a Strava rate-limit header: `"87,543"` = (15-minute, daily).
fn rate_limit_header(headers: &reqwest::header::HeaderMap, name: &str) -> Option<(u64, u64)> {
    let raw = headers.get(name)?.to_str().ok()?;
    let (short, long) = raw.split_once(',')?;
    Some((short.trim().parse().ok()?, long.trim().parse().ok()?))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
