//! Token lifecycle manager.
//!
//! The [`TokenManager`] orchestrates the OAuth flow end-to-end, persists
//! tokens through the file store, and hands out valid access tokens with
//! refresh-on-demand. It is the single entry point for consuming code that
//! needs to talk to the Strava API.

use std::path::PathBuf;

use stravactl_store::{TokenSet, TokenStore};

use crate::callback::CallbackServer;
use crate::error::{AuthError, Result};
use crate::oauth::OAuthFlow;

/// Default port for the local OAuth callback server.
pub const DEFAULT_CALLBACK_PORT: u16 = 8723;

/// Default timeout for the callback server in seconds (5 minutes).
pub const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 300;

// ---------------------------------------------------------------------------
// TokenManager
// ---------------------------------------------------------------------------

/// Non-network snapshot of the stored credentials, for `auth status`.
#[derive(Debug, Clone)]
pub struct TokenStatus {
    /// Where the token file lives.
    pub path: PathBuf,
    /// The authenticated athlete's id, if captured at login.
    pub athlete_id: Option<u64>,
    /// The scopes the user granted.
    pub scope: Vec<String>,
    /// Unix timestamp when the access token expires.
    pub expires_at: i64,
    /// Seconds until expiry; negative if already past.
    pub expires_in_secs: i64,
    /// Whether the margin-adjusted expiry has passed.
    pub expired: bool,
}

/// High-level manager for the Strava token lifecycle.
///
/// Coordinates the browser authorization flow, keeps the token file
/// current, and refreshes expired access tokens on demand — including
/// persisting Strava's rotated refresh tokens.
pub struct TokenManager {
    store: TokenStore,
    flow: OAuthFlow,
    callback_port: u16,
    callback_timeout_secs: u64,
}

impl TokenManager {
    /// Create a manager over the given store and flow.
    pub fn new(store: TokenStore, flow: OAuthFlow) -> Self {
        Self {
            store,
            flow,
            callback_port: DEFAULT_CALLBACK_PORT,
            callback_timeout_secs: DEFAULT_CALLBACK_TIMEOUT_SECS,
        }
    }

    /// Override the local callback port (must match the app's registered
    /// redirect URI).
    pub fn with_callback_port(mut self, port: u16) -> Self {
        self.callback_port = port;
        self
    }

    /// Override how long the callback server waits for the redirect.
    pub fn with_callback_timeout(mut self, timeout_secs: u64) -> Self {
        self.callback_timeout_secs = timeout_secs;
        self
    }

    /// The underlying token store.
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Perform the full browser authorization flow.
    ///
    /// This method:
    /// 1. Generates a random state parameter for CSRF protection.
    /// 2. Builds the authorization URL and passes it to `announce` (the CLI
    ///    prints it and may open a browser).
    /// 3. Runs the local callback server and waits for the redirect.
    /// 4. Verifies the state parameter matches.
    /// 5. Exchanges the code for tokens, capturing the athlete id and the
    ///    scopes the user actually granted.
    /// 6. Persists the token set atomically.
    ///
    /// # Errors
    ///
    /// Returns errors if any step fails (callback timeout, state mismatch,
    /// token exchange, persistence).
    pub async fn login<F>(&self, announce: F) -> Result<TokenSet>
    where
        F: FnOnce(&str),
    {
        tracing::info!("starting Strava authorization flow");

        let state = uuid::Uuid::now_v7().to_string();
        let auth_url = self.flow.authorization_url(&state)?;

        announce(&auth_url);

        let params =
            CallbackServer::start(self.callback_port, self.callback_timeout_secs).await?;

        // Verify state matches to prevent CSRF.
        if params.state != state {
            return Err(AuthError::FlowFailed {
                reason: format!("state mismatch: expected {state}, got {}", params.state),
            });
        }

        tracing::debug!("state parameter verified, exchanging code for tokens");

        let tokens = self
            .flow
            .exchange_code(&params.code, &params.granted_scopes)
            .await?;

        self.store.save(&tokens)?;

        tracing::info!(
            athlete_id = ?tokens.athlete_id,
            scope = ?tokens.scope,
            "authorization flow completed"
        );
        Ok(tokens)
    }

    /// Get a valid access token, refreshing if the stored one is expired.
    ///
    /// A successful refresh persists the rotated refresh token before
    /// returning — Strava invalidates the old one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotLoggedIn`](stravactl_store::StoreError) if
    /// no tokens are stored, or [`AuthError::InvalidGrant`] if the refresh
    /// is rejected.
    pub async fn access_token(&self) -> Result<String> {
        let tokens = self.store.load()?;

        if !tokens.is_expired() {
            return Ok(tokens.access_token);
        }

        tracing::debug!("access token expired, refreshing");
        let refreshed = self.refresh_and_persist(tokens).await?;
        Ok(refreshed.access_token)
    }

    /// Refresh unconditionally and persist the result.
    pub async fn force_refresh(&self) -> Result<TokenSet> {
        let tokens = self.store.load()?;
        self.refresh_and_persist(tokens).await
    }

    /// Report on the stored credentials without any network calls.
    pub fn status(&self) -> Result<TokenStatus> {
        let tokens = self.store.load()?;
        Ok(TokenStatus {
            path: self.store.path().to_path_buf(),
            athlete_id: tokens.athlete_id,
            scope: tokens.scope.clone(),
            expires_at: tokens.expires_at,
            expires_in_secs: tokens.expires_in_secs(),
            expired: tokens.is_expired(),
        })
    }

    /// Log out: optionally revoke the application's access with Strava,
    /// then delete the local token file.
    ///
    /// Deauthorization is best-effort — a network failure is logged and the
    /// local file is still deleted, since the user asked to log out and the
    /// token may already be revoked server-side.
    ///
    /// Returns whether the remote deauthorization succeeded.
    pub async fn logout(&self, deauthorize: bool) -> Result<bool> {
        let mut deauthorized = false;

        if deauthorize {
            match self.store.load() {
                Ok(tokens) => match self.flow.deauthorize(&tokens.access_token).await {
                    Ok(()) => deauthorized = true,
                    Err(e) => {
                        tracing::warn!(error = %e, "deauthorize failed; deleting local tokens anyway");
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "could not load tokens for deauthorize");
                }
            }
        }

        self.store.delete()?;
        Ok(deauthorized)
    }

    // -- Internal helpers ---------------------------------------------------

    /// Refresh, re-attach state the refresh response lacks, and persist.
    async fn refresh_and_persist(&self, old: TokenSet) -> Result<TokenSet> {
        let mut refreshed = self.flow.refresh(&old.refresh_token).await?;

        // Refresh responses carry neither the athlete nor the scope list;
        // both were fixed at login.
        refreshed.athlete_id = old.athlete_id;
        refreshed.scope = old.scope;

        self.store.save(&refreshed)?;

        tracing::info!(expires_at = refreshed.expires_at, "access token refreshed");
        Ok(refreshed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::OAuthConfig;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn test_manager(dir: &std::path::Path, token_url: Option<String>) -> TokenManager {
        let store = TokenStore::new(dir.join("tokens.json"));
        let mut config = OAuthConfig::new("12345", "secret", "http://127.0.0.1:8723/callback");
        if let Some(url) = token_url {
            config.token_url = url;
        }
        TokenManager::new(store, OAuthFlow::new(config))
    }

    fn fresh_tokens() -> TokenSet {
        TokenSet {
            access_token: "acc_live".to_string(),
            refresh_token: "ref_live".to_string(),
            expires_at: chrono::Utc::now().timestamp() + 3600,
            scope: vec!["read".to_string(), "activity:read_all".to_string()],
            athlete_id: Some(1234567),
        }
    }

    fn expired_tokens() -> TokenSet {
        let mut tokens = fresh_tokens();
        tokens.expires_at = chrono::Utc::now().timestamp() - 100;
        tokens
    }

    /// Serve a single canned HTTP response on an ephemeral port and return
    /// the URL. Enough of an OAuth token endpoint for reqwest.
    async fn mock_token_endpoint(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await.unwrap();

            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.flush().await.unwrap();
        });

        format!("http://127.0.0.1:{port}/oauth/token")
    }

    #[tokio::test]
    async fn access_token_returns_unexpired_token_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let manager = test_manager(dir.path(), None);
        manager.store().save(&fresh_tokens()).unwrap();

        let token = manager.access_token().await.unwrap();
        assert_eq!(token, "acc_live");
    }

    #[tokio::test]
    async fn access_token_without_login_fails() {
        let dir = tempfile::tempdir().unwrap();
        let manager = test_manager(dir.path(), None);

        let result = manager.access_token().await;
        assert!(matches!(
            result,
            Err(AuthError::Store(
                stravactl_store::StoreError::NotLoggedIn { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_rotation_persisted() {
        let body = r#"{
            "token_type": "Bearer",
            "access_token": "acc_new",
            "refresh_token": "ref_rotated",
            "expires_at": 9999999999,
            "expires_in": 21600
        }"#;
        let token_url = mock_token_endpoint("HTTP/1.1 200 OK", body).await;

        let dir = tempfile::tempdir().unwrap();
        let manager = test_manager(dir.path(), Some(token_url));
        manager.store().save(&expired_tokens()).unwrap();

        let token = manager.access_token().await.unwrap();
        assert_eq!(token, "acc_new");

        // The rotated refresh token must be on disk, and the athlete id and
        // scopes carried over from the old set.
        let persisted = manager.store().load().unwrap();
        assert_eq!(persisted.refresh_token, "ref_rotated");
        assert_eq!(persisted.athlete_id, Some(1234567));
        assert_eq!(persisted.scope, vec!["read", "activity:read_all"]);
    }

    #[tokio::test]
    async fn force_refresh_refreshes_valid_token() {
        let body = r#"{
            "access_token": "acc_forced",
            "refresh_token": "ref_forced",
            "expires_at": 9999999999
        }"#;
        let token_url = mock_token_endpoint("HTTP/1.1 200 OK", body).await;

        let dir = tempfile::tempdir().unwrap();
        let manager = test_manager(dir.path(), Some(token_url));
        manager.store().save(&fresh_tokens()).unwrap();

        let refreshed = manager.force_refresh().await.unwrap();
        assert_eq!(refreshed.access_token, "acc_forced");
        assert_eq!(manager.store().load().unwrap().access_token, "acc_forced");
    }

    #[tokio::test]
    async fn rejected_refresh_is_invalid_grant() {
        let body = r#"{"message": "Bad Request", "errors": [{"resource": "RefreshToken", "field": "refresh_token", "code": "invalid"}]}"#;
        let token_url = mock_token_endpoint("HTTP/1.1 400 Bad Request", body).await;

        let dir = tempfile::tempdir().unwrap();
        let manager = test_manager(dir.path(), Some(token_url));
        manager.store().save(&expired_tokens()).unwrap();

        let result = manager.access_token().await;
        assert!(matches!(result, Err(AuthError::InvalidGrant { .. })));

        // The old tokens stay on disk so the user can retry or re-login.
        assert!(manager.store().exists());
    }

    #[tokio::test]
    async fn status_reports_stored_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let manager = test_manager(dir.path(), None);
        manager.store().save(&fresh_tokens()).unwrap();

        let status = manager.status().unwrap();
        assert_eq!(status.athlete_id, Some(1234567));
        assert_eq!(status.scope, vec!["read", "activity:read_all"]);
        assert!(!status.expired);
        assert!(status.expires_in_secs > 3500);
    }

    #[tokio::test]
    async fn status_flags_expired_token() {
        let dir = tempfile::tempdir().unwrap();
        let manager = test_manager(dir.path(), None);
        manager.store().save(&expired_tokens()).unwrap();

        let status = manager.status().unwrap();
        assert!(status.expired);
        assert!(status.expires_in_secs < 0);
    }

    #[tokio::test]
    async fn logout_deletes_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = test_manager(dir.path(), None);
        manager.store().save(&fresh_tokens()).unwrap();

        let deauthorized = manager.logout(false).await.unwrap();
        assert!(!deauthorized);
        assert!(!manager.store().exists());
    }

    #[tokio::test]
    async fn logout_without_login_fails() {
        let dir = tempfile::tempdir().unwrap();
        let manager = test_manager(dir.path(), None);

        let result = manager.logout(false).await;
        assert!(matches!(
            result,
            Err(AuthError::Store(
                stravactl_store::StoreError::NotLoggedIn { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn login_state_mismatch_aborts_before_token_exchange() {
        // Token endpoint that reports every connection it receives. A
        // redirect carrying the wrong state must never get this far.
        let token_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let token_url = format!(
            "http://127.0.0.1:{}/oauth/token",
            token_listener.local_addr().unwrap().port()
        );
        let (hit_tx, mut hit_rx) = tokio::sync::mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Ok((_stream, _)) = token_listener.accept().await {
                let _ = hit_tx.send(());
            }
        });

        // Claim a free port for the callback server, then release it so
        // login() can bind it.
        let callback_port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let dir = tempfile::tempdir().unwrap();
        let manager =
            test_manager(dir.path(), Some(token_url)).with_callback_port(callback_port);

        // Deliver a forged redirect once the callback server is up.
        tokio::spawn(async move {
            for _ in 0..100 {
                tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
                let Ok(mut stream) =
                    tokio::net::TcpStream::connect(("127.0.0.1", callback_port)).await
                else {
                    continue;
                };
                let request = format!(
                    "GET /callback?state=forged&code=stolen_code&scope=read HTTP/1.1\r\nHost: 127.0.0.1:{callback_port}\r\nConnection: close\r\n\r\n"
                );
                let _ = stream.write_all(request.as_bytes()).await;
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                break;
            }
        });

        let result = manager.login(|_| {}).await;
        assert!(matches!(result, Err(AuthError::FlowFailed { .. })));

        // No code exchange was attempted and nothing was persisted.
        assert!(hit_rx.try_recv().is_err());
        assert!(!manager.store().exists());
    }

    #[test]
    fn manager_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TokenManager>();
        assert_send_sync::<TokenStatus>();
    }
}
