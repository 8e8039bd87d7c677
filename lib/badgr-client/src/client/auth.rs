use std::fmt;

use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secure wrapper for sensitive string data that automatically zeroes memory on drop.
///
/// Passwords, client secrets and tokens are kept in this wrapper so they never show up
/// in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Creates a new secure string from the provided value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn mask_sensitive(value: &str) -> String {
        if value.len() <= 8 || !value.is_ascii() {
            "***".to_string()
        } else {
            format!("{}...{}", &value[..4], &value[value.len() - 4..])
        }
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::mask_sensitive(&self.0))
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl Serialize for SecureString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

/// Credentials used to obtain the initial bearer token.
///
/// Immutable once given to the client builder.
#[derive(Debug, Clone)]
pub enum Grant {
    /// Resource owner password grant (`grant_type=password`).
    Password {
        /// The Badgr account username (usually an email).
        username: String,
        /// The Badgr account password.
        password: SecureString,
    },

    /// Client credentials grant (`grant_type=client_credentials`).
    ClientCredentials {
        /// The OAuth2 application secret.
        client_secret: SecureString,
    },
}

impl Grant {
    /// The `grant_type` sent to the token endpoint.
    pub fn grant_type(&self) -> &'static str {
        match self {
            Self::Password { .. } => "password",
            Self::ClientCredentials { .. } => "client_credentials",
        }
    }

    pub(crate) fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![("grant_type".to_string(), self.grant_type().to_string())];
        match self {
            Self::Password { username, password } => {
                fields.push(("username".to_string(), username.clone()));
                fields.push(("password".to_string(), password.as_str().to_string()));
            }
            Self::ClientCredentials { client_secret } => {
                fields.push((
                    "client_secret".to_string(),
                    client_secret.as_str().to_string(),
                ));
            }
        }
        fields
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password { username, .. } => write!(f, "Password (username: {username})"),
            Self::ClientCredentials { client_secret } => {
                write!(f, "ClientCredentials (secret: {client_secret})")
            }
        }
    }
}
