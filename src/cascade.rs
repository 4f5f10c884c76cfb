//! Owned-children cleanup.
//!
//! A consumer owns its consumer bindings, a producer its producer bindings
//! and a process its process bindings. Deleting the owner deletes them
//! first, through the child service so each child gets its own handler
//! call, hooks and lock. Every child is authorized for DELETE before any is
//! removed, so a principal lacking rights on one child removes nothing.
//!
//! Past authorization the cascade is not atomic. Children are deleted one at
//! a time; if a child's handler or storage call fails, the children already
//! deleted stay deleted, the error is returned and the owner is kept.
//! Repeating the owner's delete finishes the job.

use std::sync::Arc;

use async_trait::async_trait;

use crate::authz::Action;
use crate::error::Result;
use crate::model::{
    ConsumerBinding, ConsumerKey, EntityKey, ProcessBinding, ProcessKey, ProducerBinding,
    ProducerKey, RegistryEntity,
};
use crate::principal::Principal;
use crate::service::{DeleteHook, EntityService};

pub struct OwnedChildren<K: EntityKey, C: RegistryEntity> {
    children: Arc<EntityService<C>>,
    owned_by: fn(&C, &K) -> bool,
}

impl<K: EntityKey, C: RegistryEntity> OwnedChildren<K, C> {
    pub fn new(children: Arc<EntityService<C>>, owned_by: fn(&C, &K) -> bool) -> Self {
        Self { children, owned_by }
    }
}

#[async_trait]
impl<P, K, C> DeleteHook<P> for OwnedChildren<K, C>
where
    P: RegistryEntity<Key = K>,
    K: EntityKey,
    C: RegistryEntity,
{
    async fn before_delete(&self, principal: &Principal, parent: &P) -> Result<()> {
        let owned_by = self.owned_by;
        let owner = parent.key();
        let owned: Vec<C> = self
            .children
            .view()
            .find_all(|child| owned_by(child, owner))
            .await?
            .collect();
        if owned.is_empty() {
            return Ok(());
        }

        for child in &owned {
            self.children
                .guard()
                .pre_authorize(principal, Action::Delete, child)?;
        }
        tracing::debug!(
            kind = %P::KIND,
            key = %owner,
            children = owned.len(),
            child_kind = %C::KIND,
            "cascading delete to owned children"
        );
        for child in &owned {
            self.children.delete(principal, child).await?;
        }
        Ok(())
    }
}

// ── Ownership rules ──────────────────────────────────────────

pub fn consumer_binding_of(binding: &ConsumerBinding, consumer: &ConsumerKey) -> bool {
    binding.key.consumer == *consumer
}

pub fn producer_binding_of(binding: &ProducerBinding, producer: &ProducerKey) -> bool {
    binding.key.producer == *producer
}

pub fn process_binding_of(binding: &ProcessBinding, process: &ProcessKey) -> bool {
    binding.key.process() == *process
}
