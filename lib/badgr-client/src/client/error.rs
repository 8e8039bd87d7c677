use super::oauth2::AuthError;
use super::transport::TransportError;

/// Errors that can occur when using the [`ApiClient`](super::ApiClient) or a resource model.
///
/// Usage and validation failures are reported before any request is sent.
/// Nothing is retried: every error surfaces to the caller at the point of violation.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ApiClientError {
    /// The operation was called in a way that can never succeed.
    ///
    /// Occurs when an id-dependent operation runs on an entity without id, when an
    /// enumerated value is unknown, or when a badge reference cannot be resolved.
    #[display("Usage error: {message}")]
    #[from(skip)]
    Usage {
        /// What was wrong with the call.
        message: String,
    },

    /// A creation payload is missing a required field.
    #[display("Validation error: {message}")]
    #[from(skip)]
    Validation {
        /// Which requirement was not met.
        message: String,
    },

    /// A badge class with the same name is already known for this issuer.
    #[display("Badge class '{name}' already exists for issuer '{issuer_eid}'")]
    #[from(skip)]
    DuplicateName {
        /// The rejected badge class name.
        name: String,
        /// The issuer owning the existing badge class.
        issuer_eid: String,
    },

    /// The badge class names of this issuer were never loaded.
    #[display("Badge class names of issuer '{issuer_eid}' are not loaded")]
    #[from(skip)]
    IssuerNotLoaded {
        /// The issuer that was looked up.
        issuer_eid: String,
    },

    /// No badge class with this name is known for the issuer.
    #[display("No badge class named '{name}' for issuer '{issuer_eid}'")]
    #[from(skip)]
    Lookup {
        /// The badge class name that was looked up.
        name: String,
        /// The issuer that was searched.
        issuer_eid: String,
    },

    /// Bearer token acquisition or refresh failed.
    Auth(AuthError),

    /// Server answered with a non-2xx status code.
    #[display("API error {status_code}: {body}")]
    #[from(skip)]
    Api {
        /// The HTTP status code received.
        status_code: u16,
        /// The (possibly truncated) response body.
        body: String,
    },

    /// The request could not be sent or its response could not be read.
    Transport(TransportError),

    /// The response does not follow the `{"result": [...]}` envelope.
    #[display("Unexpected response from '{path}': {reason}")]
    #[from(skip)]
    UnexpectedResponse {
        /// The request path.
        path: String,
        /// What was unexpected.
        reason: String,
    },

    /// JSON serialization error.
    JsonValueError(serde_json::Error),

    /// URL parsing error when building request URLs.
    UrlError(url::ParseError),

    /// Invalid HTTP header value.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// Local file could not be read.
    Io(std::io::Error),
}

impl ApiClientError {
    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn unexpected_response(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
