//! Stream registry governance core.
//!
//! Twelve entity collections (domains, schemas, zones, infrastructure,
//! streams, producers, consumers, processes and the four binding kinds) share
//! one generic lifecycle engine: create, update, status update, get,
//! find-all and delete, each run on behalf of an explicit [`Principal`].
//!
//! Storage has no foreign keys. Shared resources (zones above all) are
//! protected by an [`integrity::IntegrityEngine`] that scans every dependent
//! collection before a delete and blocks it with
//! [`RegistryError::ResourceInUse`] when anything still points at the
//! resource.
//!
//! Layering:
//! - `model`: keys, documents and the entity contract
//! - `ports`: storage, validator and handler traits
//! - `view` / `authz`: reads and the authorization guard
//! - `service`: the lifecycle engine
//! - `integrity` / `cascade`: delete hooks
//! - `registry`: wiring of all collections

pub mod authz;
pub mod cascade;
pub mod config;
pub mod error;
pub mod handlers;
pub mod integrity;
pub mod locks;
pub mod model;
pub mod ports;
pub mod principal;
pub mod registry;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod validators;
pub mod view;

pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use principal::Principal;
pub use registry::{Registry, RegistryBuilder};
pub use service::EntityService;
