//! OAuth and token lifecycle management for stravactl.
//!
//! This crate implements Strava's OAuth 2.0 authorization code flow and
//! the token lifecycle around it:
//!
//! - **Authorization code flow** against Strava's endpoints (comma-joined
//!   scopes, client secret on every token call, no PKCE)
//! - **Local callback server** for the browser redirect
//! - **Token lifecycle**: expiry detection, refresh-on-demand with
//!   refresh-token rotation, revocation
//!
//! Tokens persist through the [`stravactl_store`] file store. The
//! [`TokenManager`] orchestrates complete flows and is what consuming
//! code should use.
//!
//! # Architecture
//!
//! ```text
//! TokenManager
//! ├── OAuthFlow       (authorize URL, code exchange, refresh, deauthorize)
//! ├── CallbackServer  (local HTTP listener)
//! └── TokenStore      (atomic JSON file)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use stravactl_auth::{OAuthConfig, OAuthFlow, TokenManager};
//! use stravactl_store::TokenStore;
//!
//! # async fn example() -> stravactl_auth::error::Result<()> {
//! let store = TokenStore::at_default_path()?;
//! let config = OAuthConfig::new("12345", "secret", "http://127.0.0.1:8723/callback");
//! let manager = TokenManager::new(store, OAuthFlow::new(config));
//!
//! let tokens = manager.login(|url| println!("open: {url}")).await?;
//! println!("athlete: {:?}", tokens.athlete_id);
//! # Ok(())
//! # }
//! ```

pub mod callback;
pub mod error;
pub mod manager;
pub mod oauth;

// Re-export key types at the crate root for convenience.
pub use callback::{CallbackParams, CallbackServer};
pub use error::AuthError;
pub use manager::{DEFAULT_CALLBACK_PORT, TokenManager, TokenStatus};
pub use oauth::{DEFAULT_SCOPES, OAuthConfig, OAuthFlow};
