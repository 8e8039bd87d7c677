use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Assertion, Entity, Resource, collect};
use crate::client::path;
use crate::client::{ApiClient, ApiClientError, ReqwestTransport, Transport};

/// A Badgr badge class: the definition of a badge that can be awarded many times.
#[derive(Debug, Clone, derive_more::Deref, derive_more::DerefMut)]
pub struct BadgeClass<T = ReqwestTransport> {
    entity: Entity<T>,
}

impl<T: Transport> Resource<T> for BadgeClass<T> {
    const ENDPOINT: &'static str = path::BADGE_CLASSES;

    fn from_entity(entity: Entity<T>) -> Self {
        Self { entity }
    }
}

impl<T: Transport> BadgeClass<T> {
    /// A badge class not yet created on the server.
    pub fn new(client: &ApiClient<T>) -> Self {
        Self::from_entity(Entity::new(client, Self::ENDPOINT))
    }

    /// An existing badge class.
    pub fn with_eid(client: &ApiClient<T>, entity_id: impl Into<String>) -> Self {
        Self::from_entity(Entity::with_eid(client, Self::ENDPOINT, entity_id))
    }

    /// An existing badge class, found by name in the issuer's name cache.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::IssuerNotLoaded`] or [`ApiClientError::Lookup`] when the
    /// name cannot be resolved.
    pub async fn from_name(
        client: &ApiClient<T>,
        name: &str,
        issuer_eid: &str,
    ) -> Result<Self, ApiClientError> {
        client.ensure_badge_names(issuer_eid).await?;
        let entity_id = client.get_eid_from_badge_name(name, issuer_eid).await?;
        Ok(Self::with_eid(client, entity_id))
    }

    /// The badge class name, once loaded.
    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    /// Creates the badge class for `issuer_eid` and stores the server data.
    ///
    /// Nothing is sent when the criteria are missing, or when the name is already
    /// cached for this issuer. While the request is in flight the name stays reserved,
    /// so a concurrent creation with the same name is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::Validation`] without criteria text or URL,
    /// [`ApiClientError::DuplicateName`] when the name is taken, or the request error.
    pub async fn create(
        &mut self,
        issuer_eid: &str,
        badge_class: &NewBadgeClass,
    ) -> Result<(), ApiClientError> {
        badge_class.validate()?;

        let client = self.client().clone();
        client.ensure_badge_names(issuer_eid).await?;
        let reservation = client
            .names()
            .reserve(&badge_class.name, issuer_eid)
            .await?;

        let body = serde_json::to_value(CreateBadgeClass {
            issuer: issuer_eid,
            badge_class,
        })?;
        self.entity.create_at(path::BADGE_CLASSES, body).await?;

        if let Some(entity_id) = self.entity_id() {
            info!(%issuer_eid, name = %badge_class.name, %entity_id, "badge class created");
            if let Some(reservation) = reservation {
                reservation.commit(entity_id.to_string()).await;
            }
        }
        Ok(())
    }

    /// Lists the assertions of this badge class, optionally for one recipient only.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::Usage`] without an id, or the request error.
    pub async fn fetch_assertions(
        &self,
        recipient: Option<&str>,
    ) -> Result<Vec<Assertion<T>>, ApiClientError> {
        let path = self.children_path("assertions")?;
        let response = self
            .client()
            .get(&path)
            .with_optional_query_param("recipient", recipient)
            .await?;
        collect(self.client(), &path, response)
    }
}

/// Creation payload of a [`BadgeClass`].
///
/// At least one of the criteria text or URL is required.
///
/// ```rust
/// use badgr_client::{Alignment, Expiration, ExpirationUnit, NewBadgeClass};
///
/// let badge_class = NewBadgeClass::new("Speak Up!", "data:image/png;base64,iVBO...", "Talked at a meetup")
///     .with_criteria_text("Give a talk of at least 20 minutes")
///     .with_tags(["talk", "community"])
///     .with_alignment(Alignment::new("Public speaking"))
///     .with_expires(Expiration::new(2, ExpirationUnit::Years));
/// # let _ = badge_class;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBadgeClass {
    name: String,
    image: String,
    description: String,
    criteria_text: Option<String>,
    criteria_url: Option<String>,
    alignments: Vec<Alignment>,
    tags: Vec<String>,
    expires: Option<Expiration>,
}

impl NewBadgeClass {
    /// A badge class with its required fields. `image` is a data URI.
    pub fn new(
        name: impl Into<String>,
        image: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            description: description.into(),
            criteria_text: None,
            criteria_url: None,
            alignments: Vec::new(),
            tags: Vec::new(),
            expires: None,
        }
    }

    /// The badge class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Describes how to earn the badge.
    #[must_use]
    pub fn with_criteria_text(mut self, criteria_text: impl Into<String>) -> Self {
        self.criteria_text = Some(criteria_text.into());
        self
    }

    /// Links to a page describing how to earn the badge.
    #[must_use]
    pub fn with_criteria_url(mut self, criteria_url: impl Into<String>) -> Self {
        self.criteria_url = Some(criteria_url.into());
        self
    }

    /// Adds an alignment to an educational framework.
    #[must_use]
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignments.push(alignment);
        self
    }

    /// Adds tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Makes awarded badges expire after a while.
    #[must_use]
    pub fn with_expires(mut self, expires: Expiration) -> Self {
        self.expires = Some(expires);
        self
    }

    fn validate(&self) -> Result<(), ApiClientError> {
        let has_text = self.criteria_text.as_deref().is_some_and(|text| !text.is_empty());
        let has_url = self.criteria_url.as_deref().is_some_and(|url| !url.is_empty());
        if has_text || has_url {
            Ok(())
        } else {
            Err(ApiClientError::validation(
                "at least one of criteria_text and criteria_url is required",
            ))
        }
    }
}

#[derive(Serialize)]
struct CreateBadgeClass<'a> {
    issuer: &'a str,
    #[serde(flatten)]
    badge_class: &'a NewBadgeClass,
}

/// Alignment of a badge class to an educational standard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alignment {
    target_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_framework: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_code: Option<String>,
}

impl Alignment {
    /// An alignment to the named target.
    pub fn new(target_name: impl Into<String>) -> Self {
        Self {
            target_name: target_name.into(),
            target_url: None,
            target_description: None,
            target_framework: None,
            target_code: None,
        }
    }

    /// Sets the target URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = Some(url.into());
        self
    }

    /// Sets the target description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.target_description = Some(description.into());
        self
    }

    /// Sets the framework the target belongs to.
    #[must_use]
    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.target_framework = Some(framework.into());
        self
    }

    /// Sets the target code within its framework.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.target_code = Some(code.into());
        self
    }
}

/// How long an awarded badge stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expiration {
    amount: u32,
    duration: ExpirationUnit,
}

impl Expiration {
    /// Expires `amount` units after award.
    pub fn new(amount: u32, duration: ExpirationUnit) -> Self {
        Self { amount, duration }
    }
}

/// Time unit of an [`Expiration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpirationUnit {
    /// Days.
    Days,
    /// Weeks.
    Weeks,
    /// Months.
    Months,
    /// Years.
    Years,
}
