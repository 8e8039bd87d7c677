use serde_json::{Map, Value};
use tracing::debug;

use crate::client::path;
use crate::client::{ApiClient, ApiClientError, ReqwestTransport, Transport};
use crate::client::output;

/// The state shared by every resource model.
///
/// Holds the client the model sends its requests with, the entity id once the entity
/// exists on the server, and the last known server data.
#[derive(Debug, Clone)]
pub struct Entity<T = ReqwestTransport> {
    client: ApiClient<T>,
    endpoint: &'static str,
    entity_id: Option<String>,
    data: Option<Map<String, Value>>,
}

/// A resource exposed by a Badgr collection endpoint.
pub trait Resource<T>: Sized {
    /// The collection endpoint, e.g. `/v2/issuers`.
    const ENDPOINT: &'static str;

    /// Wraps an entity bound to [`ENDPOINT`](Self::ENDPOINT).
    fn from_entity(entity: Entity<T>) -> Self;
}

impl<T: Transport> Entity<T> {
    pub(crate) fn new(client: &ApiClient<T>, endpoint: &'static str) -> Self {
        Self {
            client: client.clone(),
            endpoint,
            entity_id: None,
            data: None,
        }
    }

    pub(crate) fn with_eid(
        client: &ApiClient<T>,
        endpoint: &'static str,
        entity_id: impl Into<String>,
    ) -> Self {
        let mut entity = Self::new(client, endpoint);
        entity.entity_id = Some(entity_id.into());
        entity
    }

    /// The client used for requests.
    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    /// The entity id, if the entity exists on the server.
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref().filter(|eid| !eid.is_empty())
    }

    /// The last known server data, `None` before the first fetch or create.
    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref()
    }

    /// Mutable access to the local data, e.g. before an [`update`](Self::update).
    pub fn data_mut(&mut self) -> &mut Map<String, Value> {
        self.data.get_or_insert_with(Map::new)
    }

    /// Returns a field of the local data.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.as_ref()?.get(field)
    }

    /// Returns a string field of the local data.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field)?.as_str()
    }

    /// Sets a field of the local data.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.data_mut().insert(field.into(), value.into());
        self
    }

    /// Replaces the local data.
    ///
    /// The entity id is taken from the `entityId` field when present.
    pub fn set_data(&mut self, data: Map<String, Value>) -> &mut Self {
        if let Some(Value::String(eid)) = data.get("entityId") {
            self.entity_id = Some(eid.clone());
        }
        self.data = Some(data);
        self
    }

    pub(crate) fn set_response(&mut self, path: &str, value: Value) -> Result<(), ApiClientError> {
        let Value::Object(data) = value else {
            return Err(ApiClientError::unexpected_response(
                path,
                "expected an entity object",
            ));
        };
        self.set_data(data);
        Ok(())
    }

    /// Returns the entity id, or a usage error naming `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::Usage`] when the entity has no id.
    pub fn require_eid(&self, operation: &str) -> Result<&str, ApiClientError> {
        self.entity_id().ok_or_else(|| {
            ApiClientError::usage(format!(
                "entityId is required to {operation} {}",
                self.endpoint
            ))
        })
    }

    /// The entity endpoint, e.g. `/v2/issuers/<eid>`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::Usage`] when the entity has no id.
    pub fn entity_path(&self) -> Result<String, ApiClientError> {
        let eid = self.require_eid("address")?;
        Ok(path::entity(self.endpoint, eid))
    }

    pub(crate) fn children_path(&self, child: &str) -> Result<String, ApiClientError> {
        let eid = self.require_eid("list the children of")?;
        Ok(path::children(self.endpoint, eid, child))
    }

    /// Reloads the local data from the server.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::Usage`] without an id, or the request error.
    pub async fn fetch(&mut self) -> Result<(), ApiClientError> {
        self.require_eid("fetch")?;
        let path = self.entity_path()?;

        let response = self.client.get(&path).await?;
        let result = output::single_result(&path, response)?;
        self.set_response(&path, result)
    }

    /// Sends the local data as a full replacement, then reloads it.
    ///
    /// Returns the response of the `PUT`. When the `PUT` fails the local data is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::Usage`] without an id, or the request error.
    pub async fn update(&mut self) -> Result<Value, ApiClientError> {
        self.require_eid("update")?;
        let path = self.entity_path()?;

        let body = Value::Object(self.data.clone().unwrap_or_default());
        let response = self.client.put(&path).with_json(body).await?;
        debug!(%path, "entity updated, reloading");
        self.fetch().await?;

        Ok(response)
    }

    /// Deletes the entity on the server and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::Usage`] without an id, or the request error.
    pub async fn delete(&self) -> Result<Value, ApiClientError> {
        self.require_eid("delete")?;
        let path = self.entity_path()?;

        self.client.delete(&path).await
    }

    /// Posts a creation payload and stores the created entity.
    pub(crate) async fn create_at(&mut self, path: &str, body: Value) -> Result<(), ApiClientError> {
        let response = self.client.post(path).with_json(body).await?;
        let result = output::single_result(path, response)?;
        self.set_response(path, result)
    }
}

/// Wraps every element of a `{"result": [...]}` response into a model.
pub(crate) fn collect<T, M>(
    client: &ApiClient<T>,
    path: &str,
    value: Value,
) -> Result<Vec<M>, ApiClientError>
where
    T: Transport,
    M: Resource<T>,
{
    output::results(path, value)?
        .into_iter()
        .map(|item| {
            let mut entity = Entity::new(client, M::ENDPOINT);
            entity.set_response(path, item)?;
            Ok(M::from_entity(entity))
        })
        .collect()
}
