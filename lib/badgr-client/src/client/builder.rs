use std::sync::Arc;
use std::time::Duration;

use url::Url;

use super::oauth2::{AuthError, AuthManager};
use super::path::{self, absolute_url};
use super::{ApiClient, ApiClientError, Grant, NameCache, ReqwestTransport, SecureString, Transport};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_CLIENT_ID: &str = "public";
const DEFAULT_SCOPE: &str = "rw:profile rw:issuer rw:backpack";

/// Builder for creating [`ApiClient`] instances.
///
/// # Default Configuration
///
/// - **Base URL**: `http://localhost:8000`
/// - **Client id**: `public`
/// - **Scope**: `rw:profile rw:issuer rw:backpack`
/// - **Unique badge names**: disabled
/// - **Refresh threshold**: zero (refresh once the token is expired)
/// - **Transport**: [`ReqwestTransport`] with a default `reqwest::Client`
///
/// A grant is required, see [`with_password_grant`](Self::with_password_grant) and
/// [`with_client_credentials`](Self::with_client_credentials).
///
/// # Example
///
/// ```rust
/// use badgr_client::ApiClient;
///
/// # fn example() -> Result<(), badgr_client::ApiClientError> {
/// let client = ApiClient::builder()
///     .with_base_url("https://api.badgr.io")
///     .with_password_grant("jane@example.org", "s3cret")
///     .with_scope("rw:issuer")
///     .with_unique_badge_names(true)
///     .build()?;
/// # let _ = client;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClientBuilder<T = ReqwestTransport> {
    transport: T,
    base_url: String,
    client_id: String,
    scope: String,
    grant: Option<Grant>,
    unique_badge_names: bool,
    refresh_threshold: Duration,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            transport: ReqwestTransport::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            grant: None,
            unique_badge_names: false,
            refresh_threshold: Duration::ZERO,
        }
    }
}

impl<T: Transport> ApiClientBuilder<T> {
    /// Builds the client.
    ///
    /// No request is sent: the first token is acquired by the first authenticated call.
    /// Use [`connect`](Self::connect) to authenticate right away.
    ///
    /// # Errors
    ///
    /// Returns an error if no grant was configured, or if the base URL is not an
    /// absolute `http`/`https` URL.
    pub fn build(self) -> Result<ApiClient<T>, ApiClientError> {
        let Self {
            transport,
            base_url,
            client_id,
            scope,
            grant,
            unique_badge_names,
            refresh_threshold,
        } = self;

        let grant = grant.ok_or_else(|| AuthError::ConfigurationError {
            reason: "a password or client credentials grant is required".to_string(),
        })?;

        let base_url = Url::parse(&base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") || !base_url.has_host() {
            return Err(ApiClientError::usage(format!(
                "base URL '{base_url}' must be an absolute http(s) URL"
            )));
        }
        let token_url = absolute_url(&base_url, path::TOKEN)?;

        let auth = AuthManager::new(token_url, client_id, scope, grant, refresh_threshold);

        Ok(ApiClient {
            transport: Arc::new(transport),
            base_url,
            auth,
            names: NameCache::new(),
            unique_badge_names,
        })
    }

    /// Builds the client and acquires the first token.
    ///
    /// # Errors
    ///
    /// Returns the [`build`](Self::build) errors, and [`ApiClientError::Auth`] if the
    /// token endpoint rejects the credentials.
    pub async fn connect(self) -> Result<ApiClient<T>, ApiClientError> {
        let client = self.build()?;
        client.authenticate().await?;
        Ok(client)
    }
}

impl<T> ApiClientBuilder<T> {
    /// Sets the API base URL, e.g. `https://api.badgr.io`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Authenticates with a Badgr username and password.
    #[must_use]
    pub fn with_password_grant(
        mut self,
        username: impl Into<String>,
        password: impl Into<SecureString>,
    ) -> Self {
        self.grant = Some(Grant::Password {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Authenticates with an OAuth2 application secret.
    #[must_use]
    pub fn with_client_credentials(mut self, client_secret: impl Into<SecureString>) -> Self {
        self.grant = Some(Grant::ClientCredentials {
            client_secret: client_secret.into(),
        });
        self
    }

    /// Sets the grant directly.
    #[must_use]
    pub fn with_grant(mut self, grant: Grant) -> Self {
        self.grant = Some(grant);
        self
    }

    /// Sets the OAuth2 client id.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Sets the requested scopes (space separated).
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Rejects badge class creation when the name already exists for the issuer.
    ///
    /// Issuer names are loaded on demand the first time they are needed.
    #[must_use]
    pub fn with_unique_badge_names(mut self, unique: bool) -> Self {
        self.unique_badge_names = unique;
        self
    }

    /// Refreshes the token this long before it expires.
    #[must_use]
    pub fn with_refresh_threshold(mut self, threshold: Duration) -> Self {
        self.refresh_threshold = threshold;
        self
    }

    /// Replaces the HTTP transport.
    pub fn with_transport<U>(self, transport: U) -> ApiClientBuilder<U>
    where
        U: Transport,
    {
        let Self {
            transport: _,
            base_url,
            client_id,
            scope,
            grant,
            unique_badge_names,
            refresh_threshold,
        } = self;

        ApiClientBuilder {
            transport,
            base_url,
            client_id,
            scope,
            grant,
            unique_badge_names,
            refresh_threshold,
        }
    }
}
