//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;

use stream_registry::authz::Authorizer;
use stream_registry::model::*;
use stream_registry::ports::Repository;
use stream_registry::registry::Repositories;
use stream_registry::store::MemoryRepository;
use stream_registry::{Principal, Registry, RegistryConfig, RegistryError, Result};

/// Every collection backed by a `MemoryRepository` the test can inspect.
pub struct Stores {
    pub domains: Arc<MemoryRepository<Domain>>,
    pub schemas: Arc<MemoryRepository<Schema>>,
    pub zones: Arc<MemoryRepository<Zone>>,
    pub infrastructure: Arc<MemoryRepository<Infrastructure>>,
    pub streams: Arc<MemoryRepository<Stream>>,
    pub producers: Arc<MemoryRepository<Producer>>,
    pub consumers: Arc<MemoryRepository<Consumer>>,
    pub processes: Arc<MemoryRepository<Process>>,
    pub stream_bindings: Arc<MemoryRepository<StreamBinding>>,
    pub producer_bindings: Arc<MemoryRepository<ProducerBinding>>,
    pub consumer_bindings: Arc<MemoryRepository<ConsumerBinding>>,
    pub process_bindings: Arc<MemoryRepository<ProcessBinding>>,
}

impl Stores {
    pub fn new() -> Self {
        Self {
            domains: Arc::new(MemoryRepository::new()),
            schemas: Arc::new(MemoryRepository::new()),
            zones: Arc::new(MemoryRepository::new()),
            infrastructure: Arc::new(MemoryRepository::new()),
            streams: Arc::new(MemoryRepository::new()),
            producers: Arc::new(MemoryRepository::new()),
            consumers: Arc::new(MemoryRepository::new()),
            processes: Arc::new(MemoryRepository::new()),
            stream_bindings: Arc::new(MemoryRepository::new()),
            producer_bindings: Arc::new(MemoryRepository::new()),
            consumer_bindings: Arc::new(MemoryRepository::new()),
            process_bindings: Arc::new(MemoryRepository::new()),
        }
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            domains: self.domains.clone(),
            schemas: self.schemas.clone(),
            zones: self.zones.clone(),
            infrastructure: self.infrastructure.clone(),
            streams: self.streams.clone(),
            producers: self.producers.clone(),
            consumers: self.consumers.clone(),
            processes: self.processes.clone(),
            stream_bindings: self.stream_bindings.clone(),
            producer_bindings: self.producer_bindings.clone(),
            consumer_bindings: self.consumer_bindings.clone(),
            process_bindings: self.process_bindings.clone(),
        }
    }
}

pub struct Fixture {
    pub registry: Registry,
    pub stores: Stores,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        let stores = Stores::new();
        let registry = Registry::builder(config)
            .repositories(stores.repositories())
            .build();
        Self { registry, stores }
    }

    pub fn with_authorizer(authorizer: Arc<dyn Authorizer>) -> Self {
        let stores = Stores::new();
        let registry = Registry::builder(RegistryConfig::default())
            .repositories(stores.repositories())
            .authorizer(authorizer)
            .build();
        Self { registry, stores }
    }

    /// Domain `orders`, schema, stream `orders/placed:v1`, zones `z1`/`z2`
    /// and `kafka` infrastructure in both zones.
    pub async fn seed_platform(&self) {
        let admin = admin();
        let r = &self.registry;
        r.domains()
            .create(&admin, Domain::new(domain(), spec()))
            .await
            .unwrap();
        r.schemas()
            .create(&admin, Schema::new(schema(), spec()))
            .await
            .unwrap();
        r.streams()
            .create(&admin, Stream::new(stream(), spec(), schema()))
            .await
            .unwrap();
        for z in ["z1", "z2"] {
            r.zones()
                .create(&admin, Zone::new(zone(z), spec()))
                .await
                .unwrap();
            r.infrastructure()
                .create(&admin, Infrastructure::new(infra(z), spec()))
                .await
                .unwrap();
        }
    }
}

// ── Principals ───────────────────────────────────────────────

pub fn admin() -> Principal {
    Principal::in_process("platform-admin", vec!["admin".into()])
}

pub fn editor() -> Principal {
    Principal::in_process("stream-owner", vec!["editor".into()])
}

pub fn operator() -> Principal {
    Principal::in_process("agent", vec!["operator".into()])
}

pub fn viewer() -> Principal {
    Principal::in_process("auditor", vec!["viewer".into()])
}

// ── Keys ─────────────────────────────────────────────────────

pub fn spec() -> Specification {
    Specification::of_type("default")
}

pub fn domain() -> DomainKey {
    DomainKey::new("orders")
}

pub fn schema() -> SchemaKey {
    SchemaKey::new(domain(), "placed_v1")
}

pub fn stream() -> StreamKey {
    StreamKey::new(domain(), "placed", 1)
}

pub fn zone(name: &str) -> ZoneKey {
    ZoneKey::new(name)
}

pub fn infra(zone_name: &str) -> InfrastructureKey {
    InfrastructureKey::new(zone(zone_name), "kafka")
}

pub fn stream_binding(zone_name: &str) -> StreamBindingKey {
    StreamBindingKey::new(stream(), infra(zone_name))
}

pub fn producer(zone_name: &str) -> ProducerKey {
    ProducerKey::new(stream(), zone(zone_name), "checkout")
}

pub fn consumer(zone_name: &str) -> ConsumerKey {
    ConsumerKey::new(stream(), zone(zone_name), "billing")
}

pub fn process() -> ProcessKey {
    ProcessKey::new(domain(), "enrich")
}

pub fn process_binding(zone_name: &str) -> ProcessBindingKey {
    ProcessBindingKey::new(domain(), zone(zone_name), "enrich")
}

// ── Failing storage ──────────────────────────────────────────

/// Storage port whose every call fails.
pub struct FailingRepository;

#[async_trait]
impl<E: RegistryEntity> Repository<E> for FailingRepository {
    async fn save_specification(&self, _entity: E) -> Result<Option<E>> {
        Err(RegistryError::Storage(anyhow!("backend unavailable")))
    }

    async fn save_status(&self, _entity: E) -> Result<Option<E>> {
        Err(RegistryError::Storage(anyhow!("backend unavailable")))
    }

    async fn find_by_id(&self, _key: &E::Key) -> Result<Option<E>> {
        Err(RegistryError::Storage(anyhow!("backend unavailable")))
    }

    async fn find_all(&self) -> Result<Vec<E>> {
        Err(RegistryError::Storage(anyhow!("backend unavailable")))
    }

    async fn delete(&self, _entity: &E) -> Result<()> {
        Err(RegistryError::Storage(anyhow!("backend unavailable")))
    }
}

/// Accepts writes without returning the stored entity.
pub struct SilentRepository;

#[async_trait]
impl<E: RegistryEntity> Repository<E> for SilentRepository {
    async fn save_specification(&self, _entity: E) -> Result<Option<E>> {
        Ok(None)
    }

    async fn save_status(&self, _entity: E) -> Result<Option<E>> {
        Ok(None)
    }

    async fn find_by_id(&self, _key: &E::Key) -> Result<Option<E>> {
        Ok(None)
    }

    async fn find_all(&self) -> Result<Vec<E>> {
        Ok(Vec::new())
    }

    async fn delete(&self, _entity: &E) -> Result<()> {
        Ok(())
    }
}
