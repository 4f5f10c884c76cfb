//! Collaborator port traits.
//! Storage backends, validators and specification handlers implement these;
//! the lifecycle engine depends only on the traits.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{RegistryEntity, Specification};

/// Per-entity-type storage.
///
/// No cross-entity constraints are expected of an implementation. Each call
/// is atomic on its own; nothing spans two calls.
#[async_trait]
pub trait Repository<E: RegistryEntity>: Send + Sync {
    /// Persist the desired state, keeping any stored status.
    /// `None` means the backend accepted the write but returned nothing.
    async fn save_specification(&self, entity: E) -> Result<Option<E>>;

    /// Persist the observed state, keeping any stored specification.
    /// Never stores the specification carried by `entity`; with no stored
    /// specification the status is kept for the first `save_specification`
    /// and `None` is returned.
    async fn save_status(&self, entity: E) -> Result<Option<E>>;

    async fn find_by_id(&self, key: &E::Key) -> Result<Option<E>>;

    /// Every stored entity, in storage order.
    async fn find_all(&self) -> Result<Vec<E>>;

    /// Idempotent: deleting a missing key is not an error.
    async fn delete(&self, entity: &E) -> Result<()>;
}

/// Stateless rule checker run before create and update. Never mutates.
#[async_trait]
pub trait Validator<E: RegistryEntity>: Send + Sync {
    async fn validate_for_create(&self, entity: &E) -> Result<()>;

    async fn validate_for_update(&self, entity: &E, existing: &E) -> Result<()>;
}

/// Computes the accepted specification for a desired entity and reacts to
/// deletes. Delete failures do not roll anything back.
#[async_trait]
pub trait Handler<E: RegistryEntity>: Send + Sync {
    async fn handle_insert(&self, entity: &E) -> Result<Specification>;

    async fn handle_update(&self, entity: &E, existing: &E) -> Result<Specification>;

    async fn handle_delete(&self, entity: &E) -> Result<()>;
}
