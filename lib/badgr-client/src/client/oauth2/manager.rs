//! Bearer token acquisition and refresh.

use std::fmt;
use std::time::Duration;

use http::{HeaderMap, Method};
use tracing::{debug, info};
use url::Url;

use super::error::AuthError;
use super::token::{OAuth2Token, TokenCache, TokenResponse};
use crate::client::Grant;
use crate::client::transport::{Transport, TransportBody, TransportError, TransportRequest};

/// Keeps a valid bearer token for the client.
///
/// The first token comes from the configured [`Grant`]. Once it expires, the next
/// authenticated call refreshes it with the `refresh_token` grant (or repeats the initial
/// grant when the server issued no refresh token). A failed request is never retried.
#[derive(Clone)]
pub struct AuthManager {
    token_url: Url,
    client_id: String,
    scope: String,
    grant: Grant,
    refresh_threshold: Duration,
    token_cache: TokenCache,
}

impl AuthManager {
    pub(crate) fn new(
        token_url: Url,
        client_id: String,
        scope: String,
        grant: Grant,
        refresh_threshold: Duration,
    ) -> Self {
        Self {
            token_url,
            client_id,
            scope,
            grant,
            refresh_threshold,
            token_cache: TokenCache::default(),
        }
    }

    /// The token endpoint URL.
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// The OAuth2 client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The requested scopes (space separated).
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Returns the current token without requesting a new one.
    pub async fn current_token(&self) -> Option<OAuth2Token> {
        self.token_cache.get().await
    }

    /// Returns a token that is not expired at the moment of return.
    ///
    /// Requests a new token when none is held or when the held one is expired,
    /// and replaces the stored token on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint answers with a non-success status,
    /// with a body lacking `access_token`, or with an unusable `expires_in`.
    pub async fn get_valid_token<T>(&self, transport: &T) -> Result<OAuth2Token, AuthError>
    where
        T: Transport,
    {
        let mut slot = self.token_cache.lock().await;

        if let Some(token) = slot.as_ref()
            && !token.should_refresh(self.refresh_threshold)
        {
            return Ok(token.clone());
        }

        let refresh_token = slot
            .as_ref()
            .and_then(OAuth2Token::refresh_token)
            .map(ToString::to_string);
        let token = match refresh_token {
            Some(refresh_token) => self.refresh(transport, &refresh_token).await?,
            None => self.acquire(transport).await?,
        };
        *slot = Some(token.clone());

        Ok(token)
    }

    /// Requests a token with the configured grant.
    async fn acquire<T>(&self, transport: &T) -> Result<OAuth2Token, AuthError>
    where
        T: Transport,
    {
        info!(grant = %self.grant, client_id = %self.client_id, "acquiring token");
        let fields = self.grant.form_fields();

        self.request_token(transport, fields, |reason| {
            AuthError::TokenAcquisitionFailed { reason }
        })
        .await
    }

    /// Requests a token with the `refresh_token` grant.
    async fn refresh<T>(&self, transport: &T, refresh_token: &str) -> Result<OAuth2Token, AuthError>
    where
        T: Transport,
    {
        info!(client_id = %self.client_id, "refreshing token");
        let fields = vec![
            ("grant_type".to_string(), "refresh_token".to_string()),
            ("refresh_token".to_string(), refresh_token.to_string()),
        ];

        self.request_token(transport, fields, |reason| AuthError::TokenRefreshFailed {
            reason,
        })
        .await
    }

    /// Sends the token request.
    ///
    /// `failure` builds the error for a request the endpoint rejected.
    async fn request_token<T>(
        &self,
        transport: &T,
        mut fields: Vec<(String, String)>,
        failure: fn(String) -> AuthError,
    ) -> Result<OAuth2Token, AuthError>
    where
        T: Transport,
    {
        fields.push(("client_id".to_string(), self.client_id.clone()));
        fields.push(("scope".to_string(), self.scope.clone()));

        let request = TransportRequest {
            method: Method::POST,
            url: self.token_url.clone(),
            headers: HeaderMap::new(),
            body: Some(TransportBody::Form(fields)),
        };

        let value = transport.send(request).await.map_err(|err| match err {
            TransportError::Decode { reason } => AuthError::InvalidTokenResponse { reason },
            err => failure(err.to_string()),
        })?;

        let response: TokenResponse =
            serde_path_to_error::deserialize(value).map_err(|err| {
                AuthError::InvalidTokenResponse {
                    reason: format!("{}: {}", err.path(), err.inner()),
                }
            })?;
        let token = OAuth2Token::try_from(response)?;
        debug!(expires_in = ?token.time_until_expiry(), "token received");

        Ok(token)
    }
}

impl fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthManager")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .field("grant", &self.grant)
            .field("refresh_threshold", &self.refresh_threshold)
            .finish_non_exhaustive()
    }
}
