//! Read-side wrapper over a repository.
//!
//! Predicates run in-process over `find_all()`, so a scan costs
//! O(stored entities of that type) whatever the backend.

use std::iter::Filter;
use std::sync::Arc;
use std::vec::IntoIter;

use crate::authz::Guard;
use crate::error::Result;
use crate::model::RegistryEntity;
use crate::ports::Repository;
use crate::principal::Principal;

/// Unscoped reads. Used by the lifecycle engine for existence checks and by
/// the integrity engine, which must see every dependent regardless of who
/// is asking.
pub struct View<E: RegistryEntity> {
    repository: Arc<dyn Repository<E>>,
}

impl<E: RegistryEntity> Clone for View<E> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<E: RegistryEntity> View<E> {
    pub fn new(repository: Arc<dyn Repository<E>>) -> Self {
        Self { repository }
    }

    pub async fn get(&self, key: &E::Key) -> Result<Option<E>> {
        self.repository.find_by_id(key).await
    }

    /// Lazily filtered storage-order sequence.
    pub async fn find_all<P>(&self, predicate: P) -> Result<Filter<IntoIter<E>, P>>
    where
        P: FnMut(&E) -> bool + Send,
    {
        let all = self.repository.find_all().await?;
        Ok(all.into_iter().filter(predicate))
    }

    /// First match in storage order, stopping at it.
    pub async fn find_any<P>(&self, predicate: P) -> Result<Option<E>>
    where
        P: FnMut(&E) -> bool + Send,
    {
        Ok(self.find_all(predicate).await?.next())
    }

    /// Reads as seen by one principal.
    pub fn scoped<'a>(&'a self, guard: &'a Guard, principal: &'a Principal) -> ScopedView<'a, E> {
        ScopedView {
            view: self,
            guard,
            principal,
        }
    }
}

/// A [`View`] with the READ permission applied.
pub struct ScopedView<'a, E: RegistryEntity> {
    view: &'a View<E>,
    guard: &'a Guard,
    principal: &'a Principal,
}

impl<E: RegistryEntity> ScopedView<'_, E> {
    pub async fn get(&self, key: &E::Key) -> Result<Option<E>> {
        let found = self.view.get(key).await?;
        Ok(self.guard.post_authorize(self.principal, found))
    }

    pub async fn find_all<P>(&self, predicate: P) -> Result<Vec<E>>
    where
        P: FnMut(&E) -> bool + Send,
    {
        let matching = self.view.find_all(predicate).await?;
        Ok(self.guard.post_filter(self.principal, matching))
    }
}
