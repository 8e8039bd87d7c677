use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::{Entity, Resource};
use crate::client::path;
use crate::client::{ApiClient, ApiClientError, ReqwestTransport, Transport};

/// Revocation reason used by [`ApiClient::revoke_assertions`].
pub const REVOKED_BY_CLIENT: &str = "Revoked by badgerclient";

/// A Badgr assertion: one badge awarded to one recipient.
#[derive(Debug, Clone, derive_more::Deref, derive_more::DerefMut)]
pub struct Assertion<T = ReqwestTransport> {
    entity: Entity<T>,
}

impl<T: Transport> Resource<T> for Assertion<T> {
    const ENDPOINT: &'static str = path::ASSERTIONS;

    fn from_entity(entity: Entity<T>) -> Self {
        Self { entity }
    }
}

impl<T: Transport> Assertion<T> {
    /// An assertion not yet issued.
    pub fn new(client: &ApiClient<T>) -> Self {
        Self::from_entity(Entity::new(client, Self::ENDPOINT))
    }

    /// An existing assertion.
    pub fn with_eid(client: &ApiClient<T>, entity_id: impl Into<String>) -> Self {
        Self::from_entity(Entity::with_eid(client, Self::ENDPOINT, entity_id))
    }

    /// The entity id of the awarded badge class, once loaded.
    pub fn badge_class_eid(&self) -> Option<&str> {
        self.get_str("badgeclass")
    }

    /// Awards a badge class and stores the server data.
    ///
    /// The badge class is either given by id, or by name and issuer through the
    /// name cache.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::Validation`] when no badge class reference is given,
    /// the name cache errors when the name cannot be resolved, or the request error.
    pub async fn create(&mut self, assertion: &NewAssertion) -> Result<(), ApiClientError> {
        let badge_eid = resolve_badge(self.client(), &assertion.badge).await?;
        let path = path::children(path::BADGE_CLASSES, &badge_eid, "assertions");

        let body = serde_json::to_value(assertion)?;
        self.entity.create_at(&path, body).await?;
        info!(%badge_eid, entity_id = ?self.entity_id(), "assertion issued");
        Ok(())
    }

    /// Revokes this assertion.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::Usage`] without an id, or the request error.
    pub async fn revoke(&self, reason: &str) -> Result<Value, ApiClientError> {
        self.require_eid("revoke")?;
        let path = self.entity_path()?;

        let response = self
            .client()
            .delete(&path)
            .with_json(json!({ "revocation_reason": reason }))
            .await?;
        info!(%path, %reason, "assertion revoked");
        Ok(response)
    }
}

async fn resolve_badge<T: Transport>(
    client: &ApiClient<T>,
    badge: &BadgeRef,
) -> Result<String, ApiClientError> {
    match badge {
        BadgeRef::Eid(eid) if !eid.is_empty() => Ok(eid.clone()),
        BadgeRef::Name {
            name,
            issuer_eid: Some(issuer_eid),
        } => {
            client.ensure_badge_names(issuer_eid).await?;
            client.get_eid_from_badge_name(name, issuer_eid).await
        }
        BadgeRef::Name {
            issuer_eid: None, ..
        } => Err(ApiClientError::validation(
            "badge_name requires issuer_eid to be resolved",
        )),
        BadgeRef::Eid(_) | BadgeRef::Missing => Err(ApiClientError::validation(
            "either badge_eid, or badge_name with issuer_eid, is required",
        )),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum BadgeRef {
    #[default]
    Missing,
    Eid(String),
    Name {
        name: String,
        issuer_eid: Option<String>,
    },
}

/// Creation payload of an [`Assertion`].
///
/// ```rust
/// use badgr_client::{Evidence, NewAssertion};
///
/// let assertion = NewAssertion::new("jane@example.org")
///     .with_badge_name("Speak Up!", "MEbkVM2SSqGwbA7mWV1r2w")
///     .with_narrative("Great talk about ownership")
///     .with_evidence(Evidence::url("https://example.org/slides"))
///     .with_notify(false);
/// # let _ = assertion;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAssertion {
    recipient: Recipient,
    #[serde(skip)]
    badge: BadgeRef,
    narrative: Option<String>,
    evidence: Vec<Evidence>,
    notify: bool,
    expires: Option<String>,
    #[serde(rename = "issuedOn")]
    issued_on: Option<String>,
}

impl NewAssertion {
    /// An assertion for the recipient email. Notifies the recipient by default.
    pub fn new(recipient_email: impl Into<String>) -> Self {
        Self {
            recipient: Recipient::email(recipient_email),
            badge: BadgeRef::Missing,
            narrative: None,
            evidence: Vec::new(),
            notify: true,
            expires: None,
            issued_on: None,
        }
    }

    /// Awards the badge class with this id.
    #[must_use]
    pub fn with_badge_eid(mut self, badge_eid: impl Into<String>) -> Self {
        self.badge = BadgeRef::Eid(badge_eid.into());
        self
    }

    /// Awards the badge class with this name, resolved through the issuer's name cache.
    #[must_use]
    pub fn with_badge_name(mut self, name: impl Into<String>, issuer_eid: impl Into<String>) -> Self {
        self.badge = BadgeRef::Name {
            name: name.into(),
            issuer_eid: Some(issuer_eid.into()),
        };
        self
    }

    /// Sets the badge class name only; creation fails until an issuer is known.
    #[must_use]
    pub fn with_badge_name_only(mut self, name: impl Into<String>) -> Self {
        self.badge = BadgeRef::Name {
            name: name.into(),
            issuer_eid: None,
        };
        self
    }

    /// Explains why the badge was awarded.
    #[must_use]
    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.narrative = Some(narrative.into());
        self
    }

    /// Attaches evidence.
    #[must_use]
    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence.push(evidence);
        self
    }

    /// Whether Badgr emails the recipient.
    #[must_use]
    pub fn with_notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    /// Expiration date, ISO 8601.
    #[must_use]
    pub fn with_expires(mut self, expires: impl Into<String>) -> Self {
        self.expires = Some(expires.into());
        self
    }

    /// Award date, ISO 8601. Defaults to now on the server.
    #[must_use]
    pub fn with_issued_on(mut self, issued_on: impl Into<String>) -> Self {
        self.issued_on = Some(issued_on.into());
        self
    }
}

/// The person receiving a badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(rename = "type")]
    kind: String,
    identity: String,
}

impl Recipient {
    /// A recipient identified by email.
    pub fn email(identity: impl Into<String>) -> Self {
        Self {
            kind: "email".to_string(),
            identity: identity.into(),
        }
    }

    /// The recipient identity, e.g. the email.
    pub fn identity(&self) -> &str {
        &self.identity
    }
}

/// Evidence supporting an assertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    narrative: Option<String>,
}

impl Evidence {
    /// Evidence hosted at `url`.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            narrative: None,
        }
    }

    /// Evidence described in text.
    pub fn narrative(narrative: impl Into<String>) -> Self {
        Self {
            url: None,
            narrative: Some(narrative.into()),
        }
    }

    /// Adds a description to URL evidence.
    #[must_use]
    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.narrative = Some(narrative.into());
        self
    }
}

/// One element of a bulk revocation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevocationEntry {
    entity_id: String,
    revocation_reason: String,
}

impl RevocationEntry {
    /// Revokes `entity_id` for `reason`.
    pub fn new(entity_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            revocation_reason: reason.into(),
        }
    }
}
