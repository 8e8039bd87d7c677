use std::path::Path;
use std::sync::Arc;

use http::Method;
use serde_json::Value;
use tracing::info;
use url::Url;

mod builder;
pub use self::builder::ApiClientBuilder;

mod call;
pub use self::call::ApiCall;

mod auth;
pub use self::auth::{Grant, SecureString};

pub mod oauth2;
pub use self::oauth2::{AuthError, AuthManager, OAuth2Token};

pub mod transport;
pub use self::transport::{ReqwestTransport, Transport, TransportBody, TransportError, TransportRequest};

pub mod path;

mod image;
pub use self::image::encode_image;

mod names;
pub use self::names::NameCache;

pub(crate) mod output;

mod error;
pub use self::error::ApiClientError;

use crate::models::{
    Assertion, BadgeClass, Issuer, NewUser, REVOKED_BY_CLIENT, RevocationEntry, collect,
};

/// Async client for the Badgr REST API.
///
/// `ApiClient` owns the bearer token and the badge class name cache. Cloning it is cheap,
/// and every clone (including the ones held by resource models) shares both.
/// Use [`ApiClientBuilder`] to create instances.
///
/// # Example
///
/// ```rust,no_run
/// use badgr_client::{ApiClient, Issuer};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), badgr_client::ApiClientError> {
/// let client = ApiClient::builder()
///     .with_base_url("https://api.badgr.io")
///     .with_password_grant("jane@example.org", "s3cret")
///     .connect()
///     .await?;
///
/// let issuers = client.fetch_issuer(None).await?;
/// for issuer in &issuers {
///     println!("{:?}", issuer.entity_id());
/// }
/// # Ok(())
/// # }
/// ```
///
/// # Thread Safety
///
/// The token is guarded by a single async mutex held during refresh, so concurrent
/// calls never refresh twice. The name cache is behind an async `RwLock`.
#[derive(Debug)]
pub struct ApiClient<T = ReqwestTransport> {
    transport: Arc<T>,
    base_url: Url,
    auth: AuthManager,
    names: NameCache,
    unique_badge_names: bool,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            base_url: self.base_url.clone(),
            auth: self.auth.clone(),
            names: self.names.clone(),
            unique_badge_names: self.unique_badge_names,
        }
    }
}

// Create
impl ApiClient {
    /// Creates a builder using the default reqwest transport.
    ///
    /// The default transport is built without a TLS backend, so it only reaches
    /// `http://` servers. For `https://` hosts, enable a reqwest TLS feature (such as
    /// `rustls`) in the application and pass the client through
    /// [`ApiClientBuilder::with_transport`] with [`ReqwestTransport::new`].
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }
}

// Accessors
impl<T: Transport> ApiClient<T> {
    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The token manager.
    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    /// The HTTP transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The badge class name cache.
    pub fn names(&self) -> &NameCache {
        &self.names
    }

    /// Whether badge class names must be unique per issuer.
    pub fn unique_badge_names(&self) -> bool {
        self.unique_badge_names
    }

    /// Acquires a token now instead of on the first authenticated call.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::Auth`] if the token endpoint rejects the request.
    pub async fn authenticate(&self) -> Result<OAuth2Token, ApiClientError> {
        let token = self.auth.get_valid_token(self.transport()).await?;
        Ok(token)
    }
}

// Calls
impl<T: Transport> ApiClient<T> {
    /// Starts a request to `path`, relative to the base URL.
    pub fn call(&self, method: Method, path: impl Into<String>) -> ApiCall<'_, T> {
        ApiCall::build(self, method, path)
    }

    /// Starts a `GET` request.
    pub fn get(&self, path: impl Into<String>) -> ApiCall<'_, T> {
        self.call(Method::GET, path)
    }

    /// Starts a `POST` request.
    pub fn post(&self, path: impl Into<String>) -> ApiCall<'_, T> {
        self.call(Method::POST, path)
    }

    /// Starts a `PUT` request.
    pub fn put(&self, path: impl Into<String>) -> ApiCall<'_, T> {
        self.call(Method::PUT, path)
    }

    /// Starts a `DELETE` request.
    pub fn delete(&self, path: impl Into<String>) -> ApiCall<'_, T> {
        self.call(Method::DELETE, path)
    }

    /// Reads a PNG or SVG file as a `data:` URI, see [`encode_image`].
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported extensions or unreadable files.
    pub fn encode_image(&self, path: impl AsRef<Path>) -> Result<String, ApiClientError> {
        encode_image(path)
    }
}

// Badge class names
impl<T: Transport> ApiClient<T> {
    /// Lists the badge classes of an issuer and caches their names.
    ///
    /// Replaces whatever was cached for this issuer. Returns the number of names loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the badge classes cannot be listed.
    pub async fn load_badge_names(&self, issuer_eid: &str) -> Result<usize, ApiClientError> {
        let badge_classes = Issuer::with_eid(self, issuer_eid)
            .fetch_badgeclasses()
            .await?;

        let mut badges = Vec::with_capacity(badge_classes.len());
        for badge_class in badge_classes {
            if let (Some(name), Some(eid)) = (badge_class.name(), badge_class.entity_id()) {
                badges.push((name.to_string(), eid.to_string()));
            }
        }

        Ok(self.names.load(issuer_eid, badges).await)
    }

    /// Resolves a badge class name through the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::IssuerNotLoaded`] if [`load_badge_names`](Self::load_badge_names)
    /// was never called for this issuer, [`ApiClientError::Lookup`] if the name is unknown.
    pub async fn get_eid_from_badge_name(
        &self,
        name: &str,
        issuer_eid: &str,
    ) -> Result<String, ApiClientError> {
        self.names.get(name, issuer_eid).await
    }

    /// Loads the issuer's names first when unique names are enforced and the issuer
    /// is not cached yet.
    pub(crate) async fn ensure_badge_names(&self, issuer_eid: &str) -> Result<(), ApiClientError> {
        if self.unique_badge_names && !self.names.is_loaded(issuer_eid).await {
            info!(%issuer_eid, "loading badge class names");
            self.load_badge_names(issuer_eid).await?;
        }
        Ok(())
    }
}

// Shortcuts
impl<T: Transport> ApiClient<T> {
    /// Lists the access tokens of the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn fetch_tokens(&self) -> Result<Value, ApiClientError> {
        self.get(path::AUTH_TOKENS).await
    }

    /// Fetches one assertion by id, or the backpack assertions when `eid` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a result list.
    pub async fn fetch_assertion(
        &self,
        eid: Option<&str>,
    ) -> Result<Vec<Assertion<T>>, ApiClientError> {
        let path = match eid {
            Some(eid) => path::entity(path::ASSERTIONS, eid),
            None => path::BACKPACK_ASSERTIONS.to_string(),
        };
        let response = self.get(&path).await?;
        collect(self, &path, response)
    }

    /// Fetches the backpack assertions, or a single one.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a result list.
    pub async fn fetch_backpack_assertion(
        &self,
        eid: Option<&str>,
    ) -> Result<Vec<Assertion<T>>, ApiClientError> {
        let path = path::collection_or_entity(path::BACKPACK_ASSERTIONS, eid);
        let response = self.get(&path).await?;
        collect(self, &path, response)
    }

    /// Fetches one badge class by id, or all visible badge classes when `eid` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a result list.
    pub async fn fetch_badgeclass(
        &self,
        eid: Option<&str>,
    ) -> Result<Vec<BadgeClass<T>>, ApiClientError> {
        let path = path::collection_or_entity(path::BADGE_CLASSES, eid);
        let response = self.get(&path).await?;
        collect(self, &path, response)
    }

    /// Fetches one issuer by id, or all issuers of the user when `eid` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a result list.
    pub async fn fetch_issuer(&self, eid: Option<&str>) -> Result<Vec<Issuer<T>>, ApiClientError> {
        let path = path::collection_or_entity(path::ISSUERS, eid);
        let response = self.get(&path).await?;
        collect(self, &path, response)
    }

    /// Fetches one backpack collection by id, or all of them when `eid` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a result list.
    pub async fn fetch_collection(&self, eid: Option<&str>) -> Result<Vec<Value>, ApiClientError> {
        let path = path::collection_or_entity(path::BACKPACK_COLLECTIONS, eid);
        let response = self.get(&path).await?;
        output::results(&path, response)
    }

    /// Revokes several assertions in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn revoke_assertions<I, S>(&self, eids: I) -> Result<Value, ApiClientError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.revoke_assertions_with_reason(eids, REVOKED_BY_CLIENT)
            .await
    }

    /// Revokes several assertions in one request, with the same reason for all.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn revoke_assertions_with_reason<I, S>(
        &self,
        eids: I,
        reason: &str,
    ) -> Result<Value, ApiClientError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = eids
            .into_iter()
            .map(|eid| RevocationEntry::new(eid, reason))
            .collect::<Vec<_>>();
        info!(count = entries.len(), "revoking assertions");

        self.post(path::ASSERTIONS_REVOKE).json(&entries)?.await
    }

    /// Registers a new Badgr user through the legacy, unauthenticated endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn create_user(&self, user: &NewUser) -> Result<Value, ApiClientError> {
        self.post(path::V1_USER_PROFILE)
            .json(user)?
            .without_authentication()
            .await
    }
}
