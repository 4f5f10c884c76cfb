//! Referential integrity for shared resources.
//!
//! Storage has no foreign keys, so before a resource is deleted every
//! dependent collection is scanned through its (unscoped) view with a pure
//! reference rule. Collections are checked in registration order; the first
//! collection with a match blocks the delete, naming that dependent. A
//! collection scan stops at its first matching entity.
//!
//! The check is point-in-time. Callers needing it to hold until the delete
//! lands run it under an exclusive `KeyLocks` lock on the resource (the
//! lifecycle engine does this when write serialization is enabled).

pub mod rules;
mod tables;

pub use tables::{
    domain_integrity, infrastructure_integrity, schema_integrity, stream_binding_integrity,
    stream_integrity, zone_integrity,
};

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{RegistryError, Result};
use crate::model::{EntityKey, EntityKind, RegistryEntity};
use crate::principal::Principal;
use crate::service::DeleteHook;
use crate::view::View;

/// One collection that may reference resources keyed by `R`.
#[async_trait]
pub trait DependentCollection<R: EntityKey>: Send + Sync {
    fn kind(&self) -> EntityKind;

    /// Key of the first stored entity referencing `resource`, if any.
    async fn first_dependent(&self, resource: &R) -> Result<Option<String>>;
}

/// A view plus the rule deciding whether one of its entities uses `R`.
struct Dependents<E: RegistryEntity, R> {
    view: View<E>,
    rule: fn(&E, &R) -> bool,
}

#[async_trait]
impl<E: RegistryEntity, R: EntityKey> DependentCollection<R> for Dependents<E, R> {
    fn kind(&self) -> EntityKind {
        E::KIND
    }

    async fn first_dependent(&self, resource: &R) -> Result<Option<String>> {
        let rule = self.rule;
        let found = self
            .view
            .find_any(|dependent| rule(dependent, resource))
            .await?;
        Ok(found.map(|dependent| dependent.key().to_string()))
    }
}

/// Ordered table of dependent collections for one resource type.
pub struct IntegrityEngine<R: EntityKey> {
    collections: Vec<Arc<dyn DependentCollection<R>>>,
}

impl<R: EntityKey> IntegrityEngine<R> {
    pub fn new() -> Self {
        Self {
            collections: Vec::new(),
        }
    }

    /// Append a dependent collection. Order of calls is check order.
    pub fn with_dependents<E: RegistryEntity>(
        self,
        view: View<E>,
        rule: fn(&E, &R) -> bool,
    ) -> Self {
        self.with_collection(Arc::new(Dependents { view, rule }))
    }

    pub fn with_collection(mut self, collection: Arc<dyn DependentCollection<R>>) -> Self {
        self.collections.push(collection);
        self
    }

    pub fn dependent_kinds(&self) -> Vec<EntityKind> {
        self.collections.iter().map(|c| c.kind()).collect()
    }

    /// `Ok` when nothing references `resource`; `ResourceInUse` naming the
    /// first dependent found otherwise.
    pub async fn can_delete(&self, resource: &R) -> Result<()> {
        for collection in &self.collections {
            if let Some(dependent_key) = collection.first_dependent(resource).await? {
                let dependent_kind = collection.kind();
                tracing::warn!(
                    kind = %R::KIND,
                    key = %resource,
                    %dependent_kind,
                    %dependent_key,
                    "delete blocked by dependent"
                );
                return Err(RegistryError::ResourceInUse {
                    resource_kind: R::KIND,
                    resource_key: resource.to_string(),
                    dependent_kind,
                    dependent_key,
                });
            }
        }
        Ok(())
    }
}

impl<R: EntityKey> Default for IntegrityEngine<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E, R> DeleteHook<E> for IntegrityEngine<R>
where
    E: RegistryEntity<Key = R>,
    R: EntityKey,
{
    async fn before_delete(&self, _principal: &Principal, entity: &E) -> Result<()> {
        self.can_delete(entity.key()).await
    }
}
