//! OAuth2 bearer token support.
//!
//! Badgr issues tokens from its `/o/token` endpoint. The [`AuthManager`] obtains the
//! first token with the configured [`Grant`](crate::Grant), shares it between every clone
//! of the client, and refreshes it once it is expired.
//!
//! # Example
//!
//! ```rust,no_run
//! use badgr_client::ApiClient;
//!
//! # async fn example() -> Result<(), badgr_client::ApiClientError> {
//! let client = ApiClient::builder()
//!     .with_base_url("https://api.badgr.io")
//!     .with_password_grant("jane@example.org", "s3cret")
//!     .build()?;
//!
//! // Token acquired on first request, refreshed once expired
//! let token = client.auth().get_valid_token(client.transport()).await?;
//! # let _ = token;
//! # Ok(())
//! # }
//! ```

mod error;
mod manager;
mod token;

pub use self::error::AuthError;
pub use self::manager::AuthManager;
pub use self::token::OAuth2Token;
