//! Token acquisition error types.

use std::fmt;

/// Errors that can occur while obtaining or refreshing a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The initial token request failed.
    TokenAcquisitionFailed {
        /// Description of the failure.
        reason: String,
    },

    /// The refresh-token request failed.
    TokenRefreshFailed {
        /// Description of the failure.
        reason: String,
    },

    /// Invalid response from the token endpoint.
    InvalidTokenResponse {
        /// Description of what was invalid.
        reason: String,
    },

    /// Configuration error.
    ConfigurationError {
        /// Description of the configuration issue.
        reason: String,
    },
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenAcquisitionFailed { reason } => {
                write!(f, "Token acquisition failed: {reason}")
            }
            Self::TokenRefreshFailed { reason } => {
                write!(f, "Token refresh failed: {reason}")
            }
            Self::InvalidTokenResponse { reason } => {
                write!(f, "Invalid OAuth2 token response: {reason}")
            }
            Self::ConfigurationError { reason } => {
                write!(f, "OAuth2 configuration error: {reason}")
            }
        }
    }
}
