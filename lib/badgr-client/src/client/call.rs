use std::future::{Future, IntoFuture};
use std::pin::Pin;

use http::header::{ACCEPT, AUTHORIZATION};
use http::{HeaderMap, HeaderValue, Method};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::path::absolute_url;
use super::transport::{Transport, TransportBody, TransportError, TransportRequest};
use super::{ApiClient, ApiClientError};

/// A single request to the Badgr API.
///
/// Created by [`ApiClient::call`] or its `get`/`post`/`put`/`delete` shortcuts, configured
/// with the `with_*` methods, then executed by awaiting it.
///
/// # Default Behavior
///
/// - **Authentication**: `Authorization: Bearer <token>` with a token that is valid at send time
/// - **Body**: none; a JSON body set on a `GET` call is not sent
/// - **Result**: the parsed JSON response (`Value::Null` for an empty body)
///
/// # Example
///
/// ```rust,no_run
/// # async fn example(client: &badgr_client::ApiClient) -> Result<(), badgr_client::ApiClientError> {
/// let assertions = client
///     .get("/v2/badgeclasses/s0ziri1LRpyrZs6cNQVnHw/assertions")
///     .with_query_param("recipient", "jane@example.org")
///     .await?;
/// # let _ = assertions;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
#[must_use = "an ApiCall does nothing until awaited"]
pub struct ApiCall<'c, T: Transport> {
    client: &'c ApiClient<T>,
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    authenticated: bool,
}

impl<'c, T: Transport> ApiCall<'c, T> {
    pub(super) fn build(client: &'c ApiClient<T>, method: Method, path: impl Into<String>) -> Self {
        Self {
            client,
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            authenticated: true,
        }
    }

    /// Adds a query parameter.
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Adds an optional query parameter; `None` is skipped.
    pub fn with_optional_query_param(
        self,
        name: impl Into<String>,
        value: Option<impl Into<String>>,
    ) -> Self {
        match value {
            Some(value) => self.with_query_param(name, value),
            None => self,
        }
    }

    /// Sets the JSON body.
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serializes the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be represented as JSON.
    pub fn json<B>(self, body: &B) -> Result<Self, ApiClientError>
    where
        B: Serialize + ?Sized,
    {
        let value = serde_json::to_value(body)?;
        Ok(self.with_json(value))
    }

    /// Sends the request without an `Authorization` header.
    pub fn without_authentication(mut self) -> Self {
        self.authenticated = false;
        self
    }

    /// Returns the request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Executes the request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::Auth`] if no valid token can be obtained,
    /// [`ApiClientError::Api`] if the server answers with a non-2xx status,
    /// and [`ApiClientError::Transport`] for network failures.
    pub async fn exchange(self) -> Result<Value, ApiClientError> {
        let Self {
            client,
            method,
            path,
            query,
            body,
            authenticated,
        } = self;

        let mut url = absolute_url(client.base_url(), &path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(&query);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if authenticated {
            let token = client.auth().get_valid_token(client.transport()).await?;
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.access_token()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let body = match body {
            Some(_) if method == Method::GET => {
                debug!(%path, "ignoring body of GET request");
                None
            }
            body => body.map(TransportBody::Json),
        };

        let request = TransportRequest {
            method,
            url,
            headers,
            body,
        };
        debug!(method = %request.method, %path, authenticated, "calling API");

        client
            .transport()
            .send(request)
            .await
            .map_err(|err| match err {
                TransportError::Status { status_code, body } => {
                    ApiClientError::Api { status_code, body }
                }
                err => ApiClientError::Transport(err),
            })
    }
}

/// Enables direct `.await` on an [`ApiCall`].
impl<'c, T: Transport> IntoFuture for ApiCall<'c, T> {
    type Output = Result<Value, ApiClientError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'c>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.exchange())
    }
}
