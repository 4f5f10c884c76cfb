//! Specification handlers, dispatched by `Specification::kind`.
//!
//! A handler turns a desired specification into the accepted one (filling
//! defaults, reserving names, provisioning) and reacts to deletes. Exactly
//! one handler may claim a given type.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{RegistryError, Result};
use crate::model::{RegistryEntity, Specification};
use crate::ports::Handler;

#[async_trait]
pub trait SpecificationHandler<E: RegistryEntity>: Send + Sync {
    /// The `Specification::kind` this handler owns.
    fn handles_type(&self) -> &str;

    async fn handle_insert(&self, entity: &E) -> Result<Specification>;

    async fn handle_update(&self, entity: &E, existing: &E) -> Result<Specification>;

    async fn handle_delete(&self, _entity: &E) -> Result<()> {
        Ok(())
    }
}

/// Accepts the desired specification as submitted.
pub struct DefaultSpecificationHandler;

impl DefaultSpecificationHandler {
    pub const TYPE: &'static str = "default";
}

#[async_trait]
impl<E: RegistryEntity> SpecificationHandler<E> for DefaultSpecificationHandler {
    fn handles_type(&self) -> &str {
        Self::TYPE
    }

    async fn handle_insert(&self, entity: &E) -> Result<Specification> {
        Ok(entity.specification().clone())
    }

    async fn handle_update(&self, entity: &E, _existing: &E) -> Result<Specification> {
        Ok(entity.specification().clone())
    }
}

// ── HandlerService ────────────────────────────────────────────

pub struct HandlerService<E: RegistryEntity> {
    handlers: HashMap<String, Arc<dyn SpecificationHandler<E>>>,
}

impl<E: RegistryEntity> HandlerService<E> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Service with [`DefaultSpecificationHandler`] registered.
    pub fn with_defaults() -> Self {
        let mut service = Self::new();
        service
            .handlers
            .insert(DefaultSpecificationHandler::TYPE.into(), Arc::new(DefaultSpecificationHandler));
        service
    }

    /// Register a handler; a second handler for the same type is rejected.
    pub fn register(&mut self, handler: Arc<dyn SpecificationHandler<E>>) -> Result<()> {
        let handles = handler.handles_type().to_string();
        if self.handlers.contains_key(&handles) {
            return Err(RegistryError::ValidationFailed(format!(
                "a {} handler for type '{}' is already registered",
                E::KIND,
                handles
            )));
        }
        self.handlers.insert(handles, handler);
        Ok(())
    }

    pub fn with_handler(mut self, handler: Arc<dyn SpecificationHandler<E>>) -> Result<Self> {
        self.register(handler)?;
        Ok(self)
    }

    fn handler_for(&self, entity: &E) -> Result<&Arc<dyn SpecificationHandler<E>>> {
        let kind = &entity.specification().kind;
        self.handlers.get(kind).ok_or_else(|| {
            RegistryError::ValidationFailed(format!(
                "no {} handler for type '{}' (key {})",
                E::KIND,
                kind,
                entity.key()
            ))
        })
    }
}

impl<E: RegistryEntity> Default for HandlerService<E> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[async_trait]
impl<E: RegistryEntity> Handler<E> for HandlerService<E> {
    async fn handle_insert(&self, entity: &E) -> Result<Specification> {
        self.handler_for(entity)?.handle_insert(entity).await
    }

    async fn handle_update(&self, entity: &E, existing: &E) -> Result<Specification> {
        self.handler_for(entity)?.handle_update(entity, existing).await
    }

    async fn handle_delete(&self, entity: &E) -> Result<()> {
        match self.handlers.get(&entity.specification().kind) {
            Some(handler) => handler.handle_delete(entity).await,
            None => {
                tracing::debug!(
                    kind = %E::KIND,
                    key = %entity.key(),
                    spec_type = %entity.specification().kind,
                    "no handler for deleted entity type"
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Zone, ZoneKey};
    use serde_json::json;

    struct AwsZoneHandler;

    #[async_trait]
    impl SpecificationHandler<Zone> for AwsZoneHandler {
        fn handles_type(&self) -> &str {
            "aws"
        }

        async fn handle_insert(&self, entity: &Zone) -> Result<Specification> {
            let mut spec = entity.specification.clone();
            spec.configuration = json!({"region": entity.key.name});
            Ok(spec)
        }

        async fn handle_update(&self, entity: &Zone, _existing: &Zone) -> Result<Specification> {
            self.handle_insert(entity).await
        }
    }

    fn zone(kind: &str) -> Zone {
        Zone::new(ZoneKey::new("us-east-1"), Specification::of_type(kind))
    }

    #[tokio::test]
    async fn default_handler_passes_specification_through() {
        let service = HandlerService::<Zone>::with_defaults();
        let spec = service.handle_insert(&zone("default")).await.unwrap();
        assert_eq!(spec, Specification::of_type("default"));
    }

    #[tokio::test]
    async fn dispatches_by_specification_type() {
        let service = HandlerService::<Zone>::with_defaults()
            .with_handler(Arc::new(AwsZoneHandler))
            .unwrap();
        let spec = service.handle_insert(&zone("aws")).await.unwrap();
        assert_eq!(spec.configuration, json!({"region": "us-east-1"}));
    }

    #[tokio::test]
    async fn unknown_type_is_a_validation_failure() {
        let service = HandlerService::<Zone>::with_defaults();
        let err = service.handle_insert(&zone("gcp")).await.unwrap_err();
        match err {
            RegistryError::ValidationFailed(msg) => assert!(msg.contains("'gcp'")),
            other => panic!("Expected ValidationFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_without_handler_is_a_no_op() {
        let service = HandlerService::<Zone>::new();
        assert!(service.handle_delete(&zone("gcp")).await.is_ok());
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut service = HandlerService::<Zone>::new();
        service.register(Arc::new(AwsZoneHandler)).unwrap();
        assert!(service.register(Arc::new(AwsZoneHandler)).is_err());
    }
}
