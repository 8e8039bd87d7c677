use serde::Serialize;

use crate::client::SecureString;

/// Registration payload for [`ApiClient::create_user`](crate::ApiClient::create_user).
///
/// Registering accepts the terms of service and declines marketing emails.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    first_name: String,
    last_name: String,
    email: String,
    password: SecureString,
    marketing_opt_in: bool,
    agreed_terms_service: bool,
}

impl NewUser {
    /// A user with the given identity and password.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<SecureString>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password: password.into(),
            marketing_opt_in: false,
            agreed_terms_service: true,
        }
    }

    /// The account email.
    pub fn email(&self) -> &str {
        &self.email
    }
}
