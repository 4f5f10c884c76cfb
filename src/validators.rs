//! Validators run before create and update.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{RegistryError, Result};
use crate::model::RegistryEntity;
use crate::ports::Validator;
use crate::view::View;

/// Approves everything.
pub struct AcceptAll;

#[async_trait]
impl<E: RegistryEntity> Validator<E> for AcceptAll {
    async fn validate_for_create(&self, _entity: &E) -> Result<()> {
        Ok(())
    }

    async fn validate_for_update(&self, _entity: &E, _existing: &E) -> Result<()> {
        Ok(())
    }
}

// ── Parent existence ─────────────────────────────────────────

/// One upstream-reference rule for entities of type `E`.
#[async_trait]
pub trait ParentCheck<E: RegistryEntity>: Send + Sync {
    async fn check(&self, entity: &E) -> Result<()>;
}

/// Every key returned by `parents` must resolve in `view`.
struct Exists<E: RegistryEntity, P: RegistryEntity> {
    view: View<P>,
    parents: fn(&E) -> Vec<P::Key>,
}

#[async_trait]
impl<E: RegistryEntity, P: RegistryEntity> ParentCheck<E> for Exists<E, P> {
    async fn check(&self, entity: &E) -> Result<()> {
        for parent in (self.parents)(entity) {
            if self.view.get(&parent).await?.is_none() {
                return Err(RegistryError::ValidationFailed(format!(
                    "{} {} references {} {} which does not exist",
                    E::KIND,
                    entity.key(),
                    P::KIND,
                    parent
                )));
            }
        }
        Ok(())
    }
}

/// Rejects an entity whose upstream references do not exist.
///
/// Checks run in registration order and stop at the first failure.
pub struct ParentValidator<E: RegistryEntity> {
    checks: Vec<Arc<dyn ParentCheck<E>>>,
}

impl<E: RegistryEntity> ParentValidator<E> {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn require<P: RegistryEntity>(
        mut self,
        view: View<P>,
        parents: fn(&E) -> Vec<P::Key>,
    ) -> Self {
        self.checks.push(Arc::new(Exists { view, parents }));
        self
    }

    pub fn with_check(mut self, check: Arc<dyn ParentCheck<E>>) -> Self {
        self.checks.push(check);
        self
    }

    async fn run(&self, entity: &E) -> Result<()> {
        for check in &self.checks {
            check.check(entity).await?;
        }
        Ok(())
    }
}

impl<E: RegistryEntity> Default for ParentValidator<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: RegistryEntity> Validator<E> for ParentValidator<E> {
    async fn validate_for_create(&self, entity: &E) -> Result<()> {
        self.run(entity).await
    }

    async fn validate_for_update(&self, entity: &E, _existing: &E) -> Result<()> {
        self.run(entity).await
    }
}
