use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::{Assertion, BadgeClass, Entity, NewBadgeClass, Resource, collect};
use crate::client::path;
use crate::client::{ApiClient, ApiClientError, ReqwestTransport, Transport};

/// A Badgr issuer: the organization awarding badges.
///
/// ```rust,no_run
/// use badgr_client::{ApiClient, Issuer, NewIssuer};
///
/// # async fn example(client: &ApiClient) -> Result<(), badgr_client::ApiClientError> {
/// let mut issuer = Issuer::new(client);
/// issuer
///     .create(&NewIssuer::new(
///         "Badgr Academy",
///         "Badges for the curious",
///         "academy@example.org",
///         "https://academy.example.org",
///     ))
///     .await?;
/// println!("created {:?}", issuer.entity_id());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, derive_more::Deref, derive_more::DerefMut)]
pub struct Issuer<T = ReqwestTransport> {
    entity: Entity<T>,
}

impl<T: Transport> Resource<T> for Issuer<T> {
    const ENDPOINT: &'static str = path::ISSUERS;

    fn from_entity(entity: Entity<T>) -> Self {
        Self { entity }
    }
}

impl<T: Transport> Issuer<T> {
    /// An issuer not yet created on the server.
    pub fn new(client: &ApiClient<T>) -> Self {
        Self::from_entity(Entity::new(client, Self::ENDPOINT))
    }

    /// An existing issuer. Call [`fetch`](Entity::fetch) to load its data.
    pub fn with_eid(client: &ApiClient<T>, entity_id: impl Into<String>) -> Self {
        Self::from_entity(Entity::with_eid(client, Self::ENDPOINT, entity_id))
    }

    /// The issuer name, once loaded.
    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    /// Creates the issuer and stores the server data.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the local data is then left unset.
    pub async fn create(&mut self, issuer: &NewIssuer) -> Result<(), ApiClientError> {
        let body = serde_json::to_value(issuer)?;
        self.entity.create_at(path::ISSUERS, body).await?;
        info!(entity_id = ?self.entity_id(), "issuer created");
        Ok(())
    }

    /// Lists the assertions awarded by this issuer.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::Usage`] without an id, or the request error.
    pub async fn fetch_assertions(&self) -> Result<Vec<Assertion<T>>, ApiClientError> {
        let path = self.children_path("assertions")?;
        let response = self.client().get(&path).await?;
        collect(self.client(), &path, response)
    }

    /// Lists the badge classes of this issuer.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::Usage`] without an id, or the request error.
    pub async fn fetch_badgeclasses(&self) -> Result<Vec<BadgeClass<T>>, ApiClientError> {
        let path = self.children_path("badgeclasses")?;
        let response = self.client().get(&path).await?;
        collect(self.client(), &path, response)
    }

    /// Creates a badge class owned by this issuer.
    ///
    /// # Errors
    ///
    /// See [`BadgeClass::create`].
    pub async fn create_badgeclass(
        &self,
        badge_class: &NewBadgeClass,
    ) -> Result<BadgeClass<T>, ApiClientError> {
        let issuer_eid = self.require_eid("create a badge class for")?;
        let mut created = BadgeClass::new(self.client());
        created.create(issuer_eid, badge_class).await?;
        Ok(created)
    }

    /// Adds, modifies or removes a staff member, then reloads the issuer.
    ///
    /// Goes through the legacy v1 endpoint, which uses the entity id as slug.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::Usage`] without an id, or the request error.
    pub async fn edit_staff(
        &mut self,
        action: StaffAction,
        email: &str,
        role: StaffRole,
    ) -> Result<Value, ApiClientError> {
        let slug = self.require_eid("edit the staff of")?;
        let path = path::v1_issuer_staff(slug);

        let body = json!({
            "action": action,
            "email": email,
            "role": role,
        });
        let response = self.client().post(&path).with_json(body).await?;
        info!(%action, %email, %role, "issuer staff edited");
        self.fetch().await?;

        Ok(response)
    }
}

/// Creation payload of an [`Issuer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssuer {
    name: String,
    description: String,
    email: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

impl NewIssuer {
    /// An issuer with its required fields. `email` must be verified on the account.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        email: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            email: email.into(),
            url: url.into(),
            image: None,
        }
    }

    /// Sets the issuer image, a data URI as returned by [`encode_image`](crate::encode_image).
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// What [`Issuer::edit_staff`] does to the staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum StaffAction {
    /// Grants a role to a new staff member.
    #[display("add")]
    Add,
    /// Changes the role of a staff member.
    #[display("modify")]
    Modify,
    /// Revokes every permission of a staff member.
    #[display("remove")]
    Remove,
}

/// The permission level of an issuer staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    /// Full control, including staff management.
    #[display("owner")]
    Owner,
    /// Can edit badge classes and award them.
    #[display("editor")]
    Editor,
    /// Can award badges.
    #[display("staff")]
    Staff,
}

impl FromStr for StaffAction {
    type Err = ApiClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "modify" => Ok(Self::Modify),
            "remove" => Ok(Self::Remove),
            _ => Err(ApiClientError::usage(format!(
                "staff action must be one of 'add', 'modify' or 'remove', got '{s}'"
            ))),
        }
    }
}

impl FromStr for StaffRole {
    type Err = ApiClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "editor" => Ok(Self::Editor),
            "staff" => Ok(Self::Staff),
            _ => Err(ApiClientError::usage(format!(
                "staff role must be one of 'owner', 'editor' or 'staff', got '{s}'"
            ))),
        }
    }
}
