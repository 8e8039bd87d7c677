//! # Badgr Client
//!
//! Async client for the [Badgr](https://badgr.com) badge-issuing REST API.
//!
//! The crate exposes:
//! - **[`ApiClient`]** - authenticated calls to the API, with token refresh and a badge class name cache
//! - **Resource models** - [`Issuer`], [`BadgeClass`] and [`Assertion`], thin wrappers over an [`Entity`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use badgr_client::{ApiClient, Issuer, NewAssertion, NewBadgeClass};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::builder()
//!     .with_base_url("https://api.badgr.io")
//!     .with_password_grant("jane@example.org", "s3cret")
//!     .with_unique_badge_names(true)
//!     .connect()
//!     .await?;
//!
//! let issuer = Issuer::with_eid(&client, "MEbkVM2SSqGwbA7mWV1r2w");
//! let image = client.encode_image("speak-up.png")?;
//! let badge_class = issuer
//!     .create_badgeclass(
//!         &NewBadgeClass::new("Speak Up!", image, "Talked at a meetup")
//!             .with_criteria_text("Give a talk of at least 20 minutes"),
//!     )
//!     .await?;
//!
//! let mut assertion = badgr_client::Assertion::new(&client);
//! assertion
//!     .create(&NewAssertion::new("bob@example.org").with_badge_name("Speak Up!", "MEbkVM2SSqGwbA7mWV1r2w"))
//!     .await?;
//! # let _ = badge_class;
//! # Ok(())
//! # }
//! ```
//!
//! ## Authentication
//!
//! The client uses the OAuth2 password grant (or client credentials) against `<base>/o/token`.
//! The token is refreshed before the first call made after it expires, see [`oauth2`].
//!
//! ## TLS
//!
//! `reqwest` is used without default features, so no TLS backend is compiled in. To talk to
//! an `https://` server, enable one in the application (for instance `reqwest/rustls`) and
//! hand a [`ReqwestTransport`] built from that `reqwest::Client` to
//! [`ApiClientBuilder::with_transport`].
//!
//! ## Errors
//!
//! Every operation returns [`ApiClientError`]. Usage, validation and duplicate name errors
//! are reported before any request is sent. Nothing is retried.
//!
//! ## Testing
//!
//! The HTTP layer is the [`Transport`] trait. Tests can replace [`ReqwestTransport`] with an
//! in-memory implementation through [`ApiClientBuilder::with_transport`].

mod client;
pub mod models;

pub use self::client::{
    ApiCall, ApiClient, ApiClientBuilder, ApiClientError, AuthError, AuthManager, Grant,
    NameCache, OAuth2Token, ReqwestTransport, SecureString, Transport, TransportBody,
    TransportError, TransportRequest, encode_image,
};
pub use self::client::{oauth2, path, transport};

pub use self::models::{
    Alignment, Assertion, BadgeClass, Entity, Evidence, Expiration, ExpirationUnit, Issuer,
    NewAssertion, NewBadgeClass, NewIssuer, NewUser, REVOKED_BY_CLIENT, Recipient, Resource,
    RevocationEntry, StaffAction, StaffRole,
};
