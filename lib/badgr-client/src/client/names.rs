use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::ApiClientError;

/// Badge class name → entity id, per issuer.
///
/// Entries are filled by listing an issuer's badge classes and replaced wholesale
/// on reload. Shared by every clone of the client.
#[derive(Debug, Clone, Default)]
pub struct NameCache {
    inner: Arc<RwLock<IndexMap<String, IssuerNames>>>,
}

#[derive(Debug, Default)]
struct IssuerNames {
    names: IndexMap<String, String>,
    /// Names claimed by a creation in flight. A claim lapses once its reservation is dropped.
    pending: IndexMap<String, Weak<()>>,
}

impl IssuerNames {
    fn is_taken(&mut self, name: &str) -> bool {
        self.pending.retain(|_, claim| claim.strong_count() > 0);
        self.names.contains_key(name) || self.pending.contains_key(name)
    }
}

impl NameCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the names known for `issuer_eid`.
    ///
    /// When two badge classes share a name, the last one listed wins.
    pub async fn load(
        &self,
        issuer_eid: &str,
        badges: impl IntoIterator<Item = (String, String)>,
    ) -> usize {
        let mut names = IndexMap::new();
        for (name, eid) in badges {
            if let Some(previous) = names.insert(name.clone(), eid) {
                warn!(%issuer_eid, %name, %previous, "duplicate badge class name");
            }
        }
        let count = names.len();
        info!(%issuer_eid, count, "badge class names loaded");

        let mut guard = self.inner.write().await;
        guard.entry(issuer_eid.to_string()).or_default().names = names;
        count
    }

    /// Returns `true` if the names of `issuer_eid` have been loaded.
    pub async fn is_loaded(&self, issuer_eid: &str) -> bool {
        self.inner.read().await.contains_key(issuer_eid)
    }

    /// Resolves a badge class name to its entity id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::IssuerNotLoaded`] if the issuer was never loaded,
    /// [`ApiClientError::Lookup`] if the name is unknown.
    pub async fn get(&self, name: &str, issuer_eid: &str) -> Result<String, ApiClientError> {
        let guard = self.inner.read().await;
        let issuer = guard
            .get(issuer_eid)
            .ok_or_else(|| ApiClientError::IssuerNotLoaded {
                issuer_eid: issuer_eid.to_string(),
            })?;

        issuer
            .names
            .get(name)
            .cloned()
            .ok_or_else(|| ApiClientError::Lookup {
                name: name.to_string(),
                issuer_eid: issuer_eid.to_string(),
            })
    }

    /// Returns `true` if `name` is known for a loaded issuer.
    pub async fn contains(&self, name: &str, issuer_eid: &str) -> bool {
        self.inner
            .read()
            .await
            .get(issuer_eid)
            .is_some_and(|issuer| issuer.names.contains_key(name))
    }

    /// Claims `name` for a badge class about to be created.
    ///
    /// Returns `None` when the issuer is not loaded, since no name can be checked then.
    /// The claim holds until the reservation is committed or dropped, so a second
    /// creation with the same name fails while the first one is in flight.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::DuplicateName`] if the name is known or claimed.
    pub(crate) async fn reserve(
        &self,
        name: &str,
        issuer_eid: &str,
    ) -> Result<Option<NameReservation>, ApiClientError> {
        let mut guard = self.inner.write().await;
        let Some(issuer) = guard.get_mut(issuer_eid) else {
            return Ok(None);
        };

        if issuer.is_taken(name) {
            return Err(ApiClientError::DuplicateName {
                name: name.to_string(),
                issuer_eid: issuer_eid.to_string(),
            });
        }

        let claim = Arc::new(());
        issuer
            .pending
            .insert(name.to_string(), Arc::downgrade(&claim));
        debug!(%issuer_eid, %name, "badge class name reserved");

        Ok(Some(NameReservation {
            cache: self.clone(),
            issuer_eid: issuer_eid.to_string(),
            name: name.to_string(),
            _claim: claim,
        }))
    }

    /// Forgets every loaded issuer.
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }
}

/// A badge class name held for an in-flight creation.
///
/// Dropping it without [`commit`](Self::commit) releases the name.
#[derive(Debug)]
pub(crate) struct NameReservation {
    cache: NameCache,
    issuer_eid: String,
    name: String,
    _claim: Arc<()>,
}

impl NameReservation {
    /// Records the created badge class under the reserved name.
    ///
    /// Nothing is recorded if the issuer was cleared in the meantime.
    pub(crate) async fn commit(self, entity_id: String) {
        let mut guard = self.cache.inner.write().await;
        if let Some(issuer) = guard.get_mut(&self.issuer_eid) {
            issuer.pending.shift_remove(&self.name);
            issuer.names.insert(self.name.clone(), entity_id);
        }
    }
}
