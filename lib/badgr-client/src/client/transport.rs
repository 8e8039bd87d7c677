//! HTTP transport used by the [`ApiClient`](super::ApiClient).
//!
//! The client never talks to the network directly: it builds a [`TransportRequest`]
//! and hands it to a [`Transport`]. The default implementation is [`ReqwestTransport`],
//! tests and embedders can provide their own.

use std::fmt;
use std::future::Future;

use headers::{ContentType, HeaderMapExt};
use http::{HeaderMap, Method};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

const BODY_MAX_LENGTH: usize = 1024;

/// A fully resolved HTTP request.
///
/// Query parameters are already encoded in the `url`.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// The HTTP method.
    pub method: Method,
    /// The absolute request URL.
    pub url: Url,
    /// Request headers, including `Authorization` for authenticated calls.
    pub headers: HeaderMap,
    /// The request body, if any.
    pub body: Option<TransportBody>,
}

impl TransportRequest {
    /// Returns the value of a query parameter, if present.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Returns the value of a form field, if the body is a form.
    pub fn form_field(&self, name: &str) -> Option<&str> {
        match &self.body {
            Some(TransportBody::Form(fields)) => fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// Returns the JSON body, if any.
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            Some(TransportBody::Json(value)) => Some(value),
            _ => None,
        }
    }
}

/// Body of a [`TransportRequest`].
#[derive(Clone, PartialEq, derive_more::Debug)]
pub enum TransportBody {
    /// `application/json` body.
    Json(Value),
    /// `application/x-www-form-urlencoded` body.
    #[debug("Form([REDACTED])")]
    Form(Vec<(String, String)>),
}

/// Failures reported by a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum TransportError {
    /// The server answered with a non-2xx status code.
    #[display("HTTP status {status_code}: {body}")]
    Status {
        /// The HTTP status code.
        status_code: u16,
        /// The response body, truncated to 1 KiB.
        body: String,
    },

    /// The request could not be sent.
    #[display("Network error: {reason}")]
    Network {
        /// Description of the failure.
        reason: String,
    },

    /// The response body is not valid JSON.
    #[display("Invalid response body: {reason}")]
    Decode {
        /// Description of the failure.
        reason: String,
    },
}

/// Performs HTTP requests on behalf of the client.
///
/// Implementations return the parsed JSON body on 2xx responses (`Value::Null` for an
/// empty body), and [`TransportError::Status`] otherwise. Timeouts and connection
/// management are left to the implementation.
pub trait Transport: fmt::Debug + Send + Sync + 'static {
    /// Sends the request and returns the parsed response body.
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send;
}

/// [`Transport`] backed by a [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport using the given reqwest client.
    ///
    /// Use this to configure timeouts, proxies, or TLS on the underlying client.
    /// [`ReqwestTransport::default`] has no TLS backend and only reaches `http://` URLs.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl From<reqwest::Client> for ReqwestTransport {
    fn from(client: reqwest::Client) -> Self {
        Self::new(client)
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<Value, TransportError> {
        let TransportRequest {
            method,
            url,
            mut headers,
            body,
        } = request;

        let builder = match body {
            Some(TransportBody::Json(value)) => {
                headers.typed_insert(ContentType::json());
                let data = serde_json::to_vec(&value).map_err(|err| TransportError::Decode {
                    reason: err.to_string(),
                })?;
                self.client.request(method, url).body(data)
            }
            Some(TransportBody::Form(fields)) => {
                headers.typed_insert(ContentType::form_url_encoded());
                let data = serde_urlencoded::to_string(&fields).map_err(|err| {
                    TransportError::Decode {
                        reason: err.to_string(),
                    }
                })?;
                self.client.request(method, url).body(data)
            }
            None => self.client.request(method, url),
        };
        let request = builder
            .headers(headers)
            .build()
            .map_err(|err| TransportError::Network {
                reason: err.to_string(),
            })?;

        debug!(method = %request.method(), url = %request.url(), "sending...");
        let response =
            self.client
                .execute(request)
                .await
                .map_err(|err| TransportError::Network {
                    reason: err.to_string(),
                })?;
        let status = response.status();
        debug!(%status, "...receiving");

        let text = response
            .text()
            .await
            .map_err(|err| TransportError::Network {
                reason: err.to_string(),
            })?;

        if !status.is_success() {
            let body = truncate_body(text);
            warn!(status_code = status.as_u16(), %body, "request failed");
            return Err(TransportError::Status {
                status_code: status.as_u16(),
                body,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|err| TransportError::Decode {
            reason: err.to_string(),
        })
    }
}

fn truncate_body(text: String) -> String {
    if text.len() <= BODY_MAX_LENGTH {
        return text;
    }
    let mut end = BODY_MAX_LENGTH;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &text[..end])
}
