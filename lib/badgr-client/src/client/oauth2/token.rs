//! Bearer tokens issued by the `/o/token` endpoint.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::{Mutex, MutexGuard};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::AuthError;

/// A Badgr access token and the moment it stops being usable.
///
/// Tokens are never mutated: a refresh replaces the whole token.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct OAuth2Token {
    access_token: String,
    #[zeroize(skip)]
    expires_at: Option<Instant>,
    refresh_token: Option<String>,
    #[zeroize(skip)]
    scope: Option<String>,
}

impl OAuth2Token {
    /// Returns the access token value.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the refresh token if the server issued one.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Returns the granted scopes if the server reported them.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Checks if the token is expired.
    ///
    /// A token without `expires_in` never expires.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }

    /// Checks if the token expires within `threshold`.
    pub fn should_refresh(&self, threshold: Duration) -> bool {
        self.expires_at.is_some_and(|exp| {
            Instant::now()
                .checked_add(threshold)
                .is_none_or(|limit| limit >= exp)
        })
    }

    /// Returns the time until expiration, if known.
    pub fn time_until_expiry(&self) -> Option<Duration> {
        self.expires_at
            .and_then(|exp| exp.checked_duration_since(Instant::now()))
            .filter(|left| !left.is_zero())
    }
}

impl fmt::Debug for OAuth2Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Token")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("scope", &self.scope)
            .finish()
    }
}

/// Body returned by the `/o/token` endpoint.
#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

impl TryFrom<TokenResponse> for OAuth2Token {
    type Error = AuthError;

    fn try_from(response: TokenResponse) -> Result<Self, Self::Error> {
        let TokenResponse {
            access_token,
            expires_in,
            refresh_token,
            scope,
        } = response;

        let expires_at = expires_in
            .map(|secs| {
                Instant::now()
                    .checked_add(Duration::from_secs(secs))
                    .ok_or_else(|| AuthError::InvalidTokenResponse {
                        reason: format!("expires_in out of range: {secs}"),
                    })
            })
            .transpose()?;

        Ok(Self {
            access_token,
            expires_at,
            refresh_token,
            scope,
        })
    }
}

/// Slot holding the current token, shared by every clone of the client.
///
/// Callers lock it for the whole check-and-refresh, so concurrent callers wait for
/// an in-flight refresh instead of starting their own.
#[derive(Debug, Clone, Default)]
pub(crate) struct TokenCache {
    inner: Arc<Mutex<Option<OAuth2Token>>>,
}

impl TokenCache {
    /// Returns the cached token if it exists and is not expired.
    pub(crate) async fn get(&self) -> Option<OAuth2Token> {
        let guard = self.inner.lock().await;
        guard.as_ref().filter(|t| !t.is_expired()).cloned()
    }

    /// Locks the slot for a check-and-refresh sequence.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, Option<OAuth2Token>> {
        self.inner.lock().await
    }
}
