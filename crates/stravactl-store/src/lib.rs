//! Token persistence for stravactl.
//!
//! A single-user integration needs exactly one credential: the Strava
//! OAuth token set. This crate stores it as a JSON file with atomic
//! writes and owner-only permissions.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use stravactl_store::{TokenSet, TokenStore};
//!
//! # fn example() -> stravactl_store::error::Result<()> {
//! let store = TokenStore::at_default_path()?;
//! let tokens = store.load()?;
//! if tokens.is_expired() {
//!     // refresh via stravactl-auth, then:
//!     store.save(&tokens)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod token_file;

// Re-export key types at the crate root for convenience.
pub use error::StoreError;
pub use token_file::{EXPIRY_MARGIN_SECS, TOKEN_FILE_ENV, TokenSet, TokenStore};
