//! Resource models of the Badgr API.
//!
//! [`Issuer`], [`BadgeClass`] and [`Assertion`] wrap an [`Entity`] (their id and last known
//! server data) and dereference to it for the shared `fetch`, `update` and `delete`
//! operations. Id-dependent operations fail with [`ApiClientError::Usage`](crate::ApiClientError::Usage)
//! before any request when the model has no id.
//!
//! ```rust,no_run
//! use badgr_client::{ApiClient, BadgeClass, NewAssertion};
//!
//! # async fn example(client: &ApiClient) -> Result<(), badgr_client::ApiClientError> {
//! let mut badge_class = BadgeClass::with_eid(client, "s0ziri1LRpyrZs6cNQVnHw");
//! badge_class.fetch().await?;
//!
//! badge_class.set("description", "Talked at a meetup");
//! badge_class.update().await?;
//!
//! let mut assertion = badgr_client::Assertion::new(client);
//! assertion
//!     .create(&NewAssertion::new("jane@example.org").with_badge_eid("s0ziri1LRpyrZs6cNQVnHw"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod entity;
pub use self::entity::{Entity, Resource};
pub(crate) use self::entity::collect;

mod issuer;
pub use self::issuer::{Issuer, NewIssuer, StaffAction, StaffRole};

mod badge_class;
pub use self::badge_class::{Alignment, BadgeClass, Expiration, ExpirationUnit, NewBadgeClass};

mod assertion;
pub use self::assertion::{
    Assertion, Evidence, NewAssertion, REVOKED_BY_CLIENT, Recipient, RevocationEntry,
};

mod user;
pub use self::user::NewUser;
