//! Wiring of the twelve entity services.
//!
//! Storage and specification handlers are pluggable per entity type; the
//! validators, integrity tables and owned-children cascades are fixed by
//! the model. All services share one guard and, when writes are serialized,
//! one lock table.

use std::sync::Arc;

use crate::authz::{Authorizer, Guard};
use crate::cascade::{self, OwnedChildren};
use crate::config::RegistryConfig;
use crate::handlers::HandlerService;
use crate::integrity;
use crate::locks::KeyLocks;
use crate::model::{
    Consumer, ConsumerBinding, Domain, Infrastructure, Process, ProcessBinding, Producer,
    ProducerBinding, RegistryEntity, Schema, Stream, StreamBinding, Zone,
};
use crate::ports::{Handler, Repository, Validator};
use crate::service::{DeleteHook, EntityService};
use crate::store::MemoryRepository;
use crate::validators::ParentValidator;
use crate::view::View;

pub type RepositoryOf<E> = Arc<dyn Repository<E>>;
pub type HandlerOf<E> = Arc<dyn Handler<E>>;
pub type ServiceOf<E> = Arc<EntityService<E>>;
type ValidatorOf<E> = Arc<dyn Validator<E>>;

/// One field per entity collection, each holding `$wrap<Entity>`.
macro_rules! per_collection {
    ($(#[$meta:meta])* $name:ident, $wrap:ident) => {
        $(#[$meta])*
        pub struct $name {
            pub domains: $wrap<Domain>,
            pub schemas: $wrap<Schema>,
            pub zones: $wrap<Zone>,
            pub infrastructure: $wrap<Infrastructure>,
            pub streams: $wrap<Stream>,
            pub producers: $wrap<Producer>,
            pub consumers: $wrap<Consumer>,
            pub processes: $wrap<Process>,
            pub stream_bindings: $wrap<StreamBinding>,
            pub producer_bindings: $wrap<ProducerBinding>,
            pub consumer_bindings: $wrap<ConsumerBinding>,
            pub process_bindings: $wrap<ProcessBinding>,
        }
    };
}

per_collection!(
    /// Storage port per collection.
    #[derive(Clone)]
    Repositories,
    RepositoryOf
);

per_collection!(
    /// Specification handler per collection.
    #[derive(Clone)]
    Handlers,
    HandlerOf
);

per_collection!(
    /// Unscoped reads over every collection, as used by integrity checks
    /// and parent validation.
    #[derive(Clone)]
    Views,
    View
);

per_collection!(
    #[derive(Clone)]
    Services,
    ServiceOf
);

per_collection!(Validators, ValidatorOf);

impl Repositories {
    pub fn in_memory() -> Self {
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
}

impl Default for Handlers {
    /// [`HandlerService::with_defaults`] for every collection.
    fn default() -> Self {
        Self {
            domains: Arc::new(HandlerService::with_defaults()),
            schemas: Arc::new(HandlerService::with_defaults()),
            zones: Arc::new(HandlerService::with_defaults()),
            infrastructure: Arc::new(HandlerService::with_defaults()),
            streams: Arc::new(HandlerService::with_defaults()),
            producers: Arc::new(HandlerService::with_defaults()),
            consumers: Arc::new(HandlerService::with_defaults()),
            processes: Arc::new(HandlerService::with_defaults()),
            stream_bindings: Arc::new(HandlerService::with_defaults()),
            producer_bindings: Arc::new(HandlerService::with_defaults()),
            consumer_bindings: Arc::new(HandlerService::with_defaults()),
            process_bindings: Arc::new(HandlerService::with_defaults()),
        }
    }
}

impl Views {
    pub fn over(repositories: &Repositories) -> Self {
        Self {
            domains: View::new(repositories.domains.clone()),
            schemas: View::new(repositories.schemas.clone()),
            zones: View::new(repositories.zones.clone()),
            infrastructure: View::new(repositories.infrastructure.clone()),
            streams: View::new(repositories.streams.clone()),
            producers: View::new(repositories.producers.clone()),
            consumers: View::new(repositories.consumers.clone()),
            processes: View::new(repositories.processes.clone()),
            stream_bindings: View::new(repositories.stream_bindings.clone()),
            producer_bindings: View::new(repositories.producer_bindings.clone()),
            consumer_bindings: View::new(repositories.consumer_bindings.clone()),
            process_bindings: View::new(repositories.process_bindings.clone()),
        }
    }
}

// ── Parent validation ─────────────────────────────────────────

fn parent_validators(views: &Views) -> Validators {
    Validators {
        domains: Arc::new(ParentValidator::<Domain>::new()),
        schemas: Arc::new(
            ParentValidator::<Schema>::new()
                .require(views.domains.clone(), |s| vec![s.key.domain.clone()]),
        ),
        zones: Arc::new(ParentValidator::<Zone>::new()),
        infrastructure: Arc::new(
            ParentValidator::<Infrastructure>::new()
                .require(views.zones.clone(), |i| vec![i.key.zone.clone()]),
        ),
        streams: Arc::new(
            ParentValidator::<Stream>::new()
                .require(views.domains.clone(), |s| {
                    vec![s.key.domain.clone()]
                })
                .require(views.schemas.clone(), |s| vec![s.schema.clone()]),
        ),
        producers: Arc::new(
            ParentValidator::<Producer>::new()
                .require(views.streams.clone(), |p| {
                    vec![p.key.stream.clone()]
                })
                .require(views.zones.clone(), |p| vec![p.key.zone.clone()]),
        ),
        consumers: Arc::new(
            ParentValidator::<Consumer>::new()
                .require(views.streams.clone(), |c| {
                    vec![c.key.stream.clone()]
                })
                .require(views.zones.clone(), |c| vec![c.key.zone.clone()]),
        ),
        processes: Arc::new(
            ParentValidator::<Process>::new()
                .require(views.domains.clone(), |p| {
                    vec![p.key.domain.clone()]
                })
                .require(views.zones.clone(), |p| p.zones.clone())
                .require(views.streams.clone(), |p| {
                    p.streams().cloned().collect()
                }),
        ),
        stream_bindings: Arc::new(
            ParentValidator::<StreamBinding>::new()
                .require(views.streams.clone(), |b| {
                    vec![b.key.stream.clone()]
                })
                .require(views.infrastructure.clone(), |b| {
                    vec![b.key.infrastructure.clone()]
                }),
        ),
        producer_bindings: Arc::new(
            ParentValidator::<ProducerBinding>::new()
                .require(views.producers.clone(), |b| {
                    vec![b.key.producer.clone()]
                })
                .require(views.infrastructure.clone(), |b| {
                    vec![b.key.infrastructure()]
                }),
        ),
        consumer_bindings: Arc::new(
            ParentValidator::<ConsumerBinding>::new()
                .require(views.consumers.clone(), |b| {
                    vec![b.key.consumer.clone()]
                })
                .require(views.infrastructure.clone(), |b| {
                    vec![b.key.infrastructure()]
                }),
        ),
        process_bindings: Arc::new(
            ParentValidator::<ProcessBinding>::new()
                .require(views.processes.clone(), |b| {
                    vec![b.key.process()]
                })
                .require(views.zones.clone(), |b| {
                    vec![b.key.zone.clone()]
                })
                .require(views.stream_bindings.clone(), |b| {
                    b.stream_bindings().cloned().collect()
                }),
        ),
    }
}

// ── Builder ──────────────────────────────────────────────────

pub struct RegistryBuilder {
    config: RegistryConfig,
    repositories: Repositories,
    handlers: Handlers,
    authorizer: Option<Arc<dyn Authorizer>>,
}

impl RegistryBuilder {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            repositories: Repositories::in_memory(),
            handlers: Handlers::default(),
            authorizer: None,
        }
    }

    pub fn repositories(mut self, repositories: Repositories) -> Self {
        self.repositories = repositories;
        self
    }

    pub fn handlers(mut self, handlers: Handlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Override the authorizer picked by `RegistryConfig::authorization`.
    pub fn authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    pub fn build(self) -> Registry {
        let Self {
            config,
            repositories: repos,
            handlers,
            authorizer,
        } = self;

        let guard = match authorizer {
            Some(authorizer) => Guard::new(authorizer),
            None => config.guard(),
        };
        let locks = config.serialize_writes.then(|| Arc::new(KeyLocks::new()));
        let views = Views::over(&repos);
        let validators = parent_validators(&views);

        let wire = Wiring {
            guard: &guard,
            locks: locks.as_ref(),
        };

        // Children first: the cascades on their owners delete through them.
        let stream_bindings = wire.service(
            repos.stream_bindings.clone(),
            validators.stream_bindings,
            handlers.stream_bindings,
            vec![Arc::new(integrity::stream_binding_integrity(&views))],
        );
        let producer_bindings = wire.service(
            repos.producer_bindings.clone(),
            validators.producer_bindings,
            handlers.producer_bindings,
            vec![],
        );
        let consumer_bindings = wire.service(
            repos.consumer_bindings.clone(),
            validators.consumer_bindings,
            handlers.consumer_bindings,
            vec![],
        );
        let process_bindings = wire.service(
            repos.process_bindings.clone(),
            validators.process_bindings,
            handlers.process_bindings,
            vec![],
        );

        let services = Services {
            domains: wire.service(
                repos.domains.clone(),
                validators.domains,
                handlers.domains,
                vec![Arc::new(integrity::domain_integrity(&views))],
            ),
            schemas: wire.service(
                repos.schemas.clone(),
                validators.schemas,
                handlers.schemas,
                vec![Arc::new(integrity::schema_integrity(&views))],
            ),
            zones: wire.service(
                repos.zones.clone(),
                validators.zones,
                handlers.zones,
                vec![Arc::new(integrity::zone_integrity(&views))],
            ),
            infrastructure: wire.service(
                repos.infrastructure.clone(),
                validators.infrastructure,
                handlers.infrastructure,
                vec![Arc::new(integrity::infrastructure_integrity(&views))],
            ),
            streams: wire.service(
                repos.streams.clone(),
                validators.streams,
                handlers.streams,
                vec![Arc::new(integrity::stream_integrity(&views))],
            ),
            producers: wire.service(
                repos.producers.clone(),
                validators.producers,
                handlers.producers,
                vec![Arc::new(OwnedChildren::new(
                    producer_bindings.clone(),
                    cascade::producer_binding_of,
                ))],
            ),
            consumers: wire.service(
                repos.consumers.clone(),
                validators.consumers,
                handlers.consumers,
                vec![Arc::new(OwnedChildren::new(
                    consumer_bindings.clone(),
                    cascade::consumer_binding_of,
                ))],
            ),
            processes: wire.service(
                repos.processes.clone(),
                validators.processes,
                handlers.processes,
                vec![Arc::new(OwnedChildren::new(
                    process_bindings.clone(),
                    cascade::process_binding_of,
                ))],
            ),
            stream_bindings,
            producer_bindings,
            consumer_bindings,
            process_bindings,
        };

        tracing::debug!(
            serialize_writes = config.serialize_writes,
            authorization = %config.authorization,
            "registry wired"
        );
        Registry {
            config,
            guard,
            views,
            services,
        }
    }
}

struct Wiring<'a> {
    guard: &'a Guard,
    locks: Option<&'a Arc<KeyLocks>>,
}

impl Wiring<'_> {
    fn service<E: RegistryEntity>(
        &self,
        repository: Arc<dyn Repository<E>>,
        validator: Arc<dyn Validator<E>>,
        handler: Arc<dyn Handler<E>>,
        hooks: Vec<Arc<dyn DeleteHook<E>>>,
    ) -> ServiceOf<E> {
        let mut service = EntityService::new(repository, validator, handler, self.guard.clone());
        if let Some(locks) = self.locks {
            service = service.with_locks(Arc::clone(locks));
        }
        for hook in hooks {
            service = service.with_delete_hook(hook);
        }
        Arc::new(service)
    }
}

// ── Registry ─────────────────────────────────────────────────

pub struct Registry {
    config: RegistryConfig,
    guard: Guard,
    views: Views,
    services: Services,
}

impl Registry {
    pub fn builder(config: RegistryConfig) -> RegistryBuilder {
        RegistryBuilder::new(config)
    }

    /// In-memory registry with default configuration.
    pub fn in_memory() -> Self {
        Self::builder(RegistryConfig::default()).build()
    }

    pub fn from_config(config: RegistryConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn domains(&self) -> &EntityService<Domain> {
        &self.services.domains
    }

    pub fn schemas(&self) -> &EntityService<Schema> {
        &self.services.schemas
    }

    pub fn zones(&self) -> &EntityService<Zone> {
        &self.services.zones
    }

    pub fn infrastructure(&self) -> &EntityService<Infrastructure> {
        &self.services.infrastructure
    }

    pub fn streams(&self) -> &EntityService<Stream> {
        &self.services.streams
    }

    pub fn producers(&self) -> &EntityService<Producer> {
        &self.services.producers
    }

    pub fn consumers(&self) -> &EntityService<Consumer> {
        &self.services.consumers
    }

    pub fn processes(&self) -> &EntityService<Process> {
        &self.services.processes
    }

    pub fn stream_bindings(&self) -> &EntityService<StreamBinding> {
        &self.services.stream_bindings
    }

    pub fn producer_bindings(&self) -> &EntityService<ProducerBinding> {
        &self.services.producer_bindings
    }

    pub fn consumer_bindings(&self) -> &EntityService<ConsumerBinding> {
        &self.services.consumer_bindings
    }

    pub fn process_bindings(&self) -> &EntityService<ProcessBinding> {
        &self.services.process_bindings
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
