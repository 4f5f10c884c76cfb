//! Generic lifecycle engine, one instance per entity type.
//!
//! Every operation takes the caller's [`Principal`] explicitly. Writes are
//! pre-authorized; reads go through a [`ScopedView`](crate::view::ScopedView)
//! so a deny reads as "absent".

use std::sync::Arc;

use async_trait::async_trait;

use crate::authz::{Action, Guard};
use crate::error::{RegistryError, Result};
use crate::locks::{KeyLocks, LockSet};
use crate::model::{RegistryEntity, ResourceRef, Status};
use crate::ports::{Handler, Repository, Validator};
use crate::principal::Principal;
use crate::view::View;

/// Runs after the handler and before the storage delete. An error aborts
/// the delete; nothing already done by earlier hooks is undone.
#[async_trait]
pub trait DeleteHook<E: RegistryEntity>: Send + Sync {
    async fn before_delete(&self, principal: &Principal, entity: &E) -> Result<()>;
}

pub struct EntityService<E: RegistryEntity> {
    view: View<E>,
    repository: Arc<dyn Repository<E>>,
    validator: Arc<dyn Validator<E>>,
    handler: Arc<dyn Handler<E>>,
    guard: Guard,
    locks: Option<Arc<KeyLocks>>,
    delete_hooks: Vec<Arc<dyn DeleteHook<E>>>,
}

impl<E: RegistryEntity> EntityService<E> {
    pub fn new(
        repository: Arc<dyn Repository<E>>,
        validator: Arc<dyn Validator<E>>,
        handler: Arc<dyn Handler<E>>,
        guard: Guard,
    ) -> Self {
        Self {
            view: View::new(Arc::clone(&repository)),
            repository,
            validator,
            handler,
            guard,
            locks: None,
            delete_hooks: Vec::new(),
        }
    }

    /// Serialize writes through a shared lock table.
    pub fn with_locks(mut self, locks: Arc<KeyLocks>) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Append a delete hook. Hooks run in the order they were added.
    pub fn with_delete_hook(mut self, hook: Arc<dyn DeleteHook<E>>) -> Self {
        self.delete_hooks.push(hook);
        self
    }

    /// Unscoped reads over this service's storage.
    pub fn view(&self) -> &View<E> {
        &self.view
    }

    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    // ── Writes ───────────────────────────────────────────────

    /// Create a new entity. `Ok(None)` when storage accepted the write but
    /// returned nothing.
    pub async fn create(&self, principal: &Principal, desired: E) -> Result<Option<E>> {
        self.guard.pre_authorize(principal, Action::Create, &desired)?;
        let _held = self.lock_for_write(&desired).await?;

        tracing::debug!(kind = %E::KIND, key = %desired.key(), actor = %principal.actor_id, "creating");
        if self.view.get(desired.key()).await?.is_some() {
            return Err(RegistryError::AlreadyExists {
                kind: E::KIND,
                key: desired.key().to_string(),
            });
        }
        self.validator.validate_for_create(&desired).await?;

        let mut accepted = desired;
        let specification = self.handler.handle_insert(&accepted).await?;
        accepted.set_specification(specification);

        let saved = self.repository.save_specification(accepted).await?;
        if let Some(entity) = &saved {
            tracing::info!(kind = %E::KIND, key = %entity.key(), actor = %principal.actor_id, "created");
        }
        Ok(saved)
    }

    /// Replace the specification of an existing entity.
    pub async fn update(&self, principal: &Principal, desired: E) -> Result<Option<E>> {
        self.guard.pre_authorize(principal, Action::Update, &desired)?;
        let _held = self.lock_for_write(&desired).await?;

        tracing::debug!(kind = %E::KIND, key = %desired.key(), actor = %principal.actor_id, "updating");
        let existing = self.view.get(desired.key()).await?.ok_or_else(|| {
            RegistryError::NotFound {
                kind: E::KIND,
                key: desired.key().to_string(),
            }
        })?;
        self.validator.validate_for_update(&desired, &existing).await?;

        let mut accepted = desired;
        let specification = self.handler.handle_update(&accepted, &existing).await?;
        accepted.set_specification(specification);

        let saved = self.repository.save_specification(accepted).await?;
        if let Some(entity) = &saved {
            tracing::info!(kind = %E::KIND, key = %entity.key(), actor = %principal.actor_id, "updated");
        }
        Ok(saved)
    }

    /// Record observed state reported by an agent.
    ///
    /// No existence check, validation or handler call: agents may report
    /// status for an entity before its specification lands. Only the status
    /// is persisted; the specification carried by `entity` is ignored, and
    /// storage returns `None` until a create supplies one.
    pub async fn update_status(
        &self,
        principal: &Principal,
        mut entity: E,
        status: Status,
    ) -> Result<Option<E>> {
        self.guard
            .pre_authorize(principal, Action::UpdateStatus, &entity)?;
        let _held = self.lock_key(&entity).await?;
        entity.set_status(status);

        let key = entity.key().clone();
        let saved = self.repository.save_status(entity).await?;
        match &saved {
            Some(_) => {
                tracing::info!(kind = %E::KIND, key = %key, actor = %principal.actor_id, "status updated")
            }
            None => {
                tracing::debug!(kind = %E::KIND, key = %key, actor = %principal.actor_id, "status held until created")
            }
        }
        Ok(saved)
    }

    pub async fn delete(&self, principal: &Principal, entity: &E) -> Result<()> {
        self.guard.pre_authorize(principal, Action::Delete, entity)?;
        let _held = self.lock_key(entity).await?;

        tracing::debug!(kind = %E::KIND, key = %entity.key(), actor = %principal.actor_id, "deleting");
        self.handler.handle_delete(entity).await?;
        for hook in &self.delete_hooks {
            hook.before_delete(principal, entity).await?;
        }
        self.repository.delete(entity).await?;

        tracing::info!(kind = %E::KIND, key = %entity.key(), actor = %principal.actor_id, "deleted");
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────

    /// `None` when absent or not readable by `principal`.
    pub async fn get(&self, principal: &Principal, key: &E::Key) -> Result<Option<E>> {
        self.view.scoped(&self.guard, principal).get(key).await
    }

    /// Matching entities readable by `principal`, in storage order.
    pub async fn find_all<P>(&self, principal: &Principal, predicate: P) -> Result<Vec<E>>
    where
        P: FnMut(&E) -> bool + Send,
    {
        self.view
            .scoped(&self.guard, principal)
            .find_all(predicate)
            .await
    }

    /// Exclusive lock on the entity's own key only.
    async fn lock_key(&self, entity: &E) -> Result<Option<LockSet>> {
        match &self.locks {
            Some(locks) => Ok(Some(
                locks.acquire(ResourceRef::of(entity.key()), []).await?,
            )),
            None => Ok(None),
        }
    }

    /// Exclusive lock on the entity's key, shared locks on what it references.
    async fn lock_for_write(&self, entity: &E) -> Result<Option<LockSet>> {
        match &self.locks {
            Some(locks) => Ok(Some(
                locks
                    .acquire(ResourceRef::of(entity.key()), entity.references())
                    .await?,
            )),
            None => Ok(None),
        }
    }
}

impl<E: RegistryEntity> std::fmt::Debug for EntityService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityService")
            .field("kind", &E::KIND)
            .field("serialized", &self.locks.is_some())
            .field("delete_hooks", &self.delete_hooks.len())
            .finish()
    }
}
