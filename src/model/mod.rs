//! Registry domain model: keys, documents and the entity contract.
//! These are pure value types with no storage or authorization concerns.

mod entities;
mod keys;

pub use entities::*;
pub use keys::*;

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

// ── Entity kinds ──────────────────────────────────────────────

/// Discriminator for every registry collection.
///
/// Declaration order is the dependency rank: a kind only ever references
/// kinds declared before it. Lock acquisition relies on this ordering.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Domain,
    Schema,
    Zone,
    Infrastructure,
    Stream,
    Producer,
    Consumer,
    Process,
    StreamBinding,
    ProducerBinding,
    ConsumerBinding,
    ProcessBinding,
}

/// Type-erased pointer to a stored entity, used for locking and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceRef {
    pub kind: EntityKind,
    pub key: String,
}

impl ResourceRef {
    pub fn of<K: EntityKey>(key: &K) -> Self {
        Self {
            kind: K::KIND,
            key: key.to_string(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.key)
    }
}

// ── Documents ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

/// Desired state. Opaque to the engine apart from `kind`, which picks the
/// specification handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub configuration: serde_json::Value,
    #[serde(default)]
    pub function: String,
}

impl Specification {
    pub fn of_type(kind: impl Into<String>) -> Self {
        Self {
            description: None,
            tags: Vec::new(),
            kind: kind.into(),
            configuration: serde_json::Value::Object(Default::default()),
            function: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_configuration(mut self, configuration: serde_json::Value) -> Self {
        self.configuration = configuration;
        self
    }
}

/// Observed state reported by agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub agent_status: serde_json::Value,
}

impl Status {
    pub fn new(agent_status: serde_json::Value) -> Self {
        Self { agent_status }
    }
}

// ── Entity contract ───────────────────────────────────────────

/// Identifier of one registry collection.
pub trait EntityKey:
    Clone + fmt::Debug + fmt::Display + Eq + std::hash::Hash + Ord + Send + Sync + 'static
{
    const KIND: EntityKind;
}

/// Contract every stored entity satisfies.
///
/// The key is fixed for the entity's life. Specification and status are
/// written through separate storage calls and never imply each other.
pub trait RegistryEntity: Clone + fmt::Debug + Send + Sync + 'static {
    type Key: EntityKey;

    const KIND: EntityKind = <Self::Key as EntityKey>::KIND;

    fn key(&self) -> &Self::Key;
    fn specification(&self) -> &Specification;
    fn set_specification(&mut self, specification: Specification);
    fn status(&self) -> Option<&Status>;
    fn status_mut(&mut self) -> &mut Option<Status>;

    /// Upstream entities this one points at, through its key or its
    /// desired-state relations.
    fn references(&self) -> Vec<ResourceRef> {
        Vec::new()
    }

    fn set_status(&mut self, status: Status) {
        *self.status_mut() = Some(status);
    }
}

/// Entity with no relations beyond its key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<K> {
    pub key: K,
    pub specification: Specification,
    pub status: Option<Status>,
}

impl<K> Record<K> {
    pub fn new(key: K, specification: Specification) -> Self {
        Self {
            key,
            specification,
            status: None,
        }
    }
}

impl<K> RegistryEntity for Record<K>
where
    K: EntityKey + KeyReferences,
{
    type Key = K;

    fn key(&self) -> &K {
        &self.key
    }

    fn specification(&self) -> &Specification {
        &self.specification
    }

    fn set_specification(&mut self, specification: Specification) {
        self.specification = specification;
    }

    fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    fn status_mut(&mut self) -> &mut Option<Status> {
        &mut self.status
    }

    fn references(&self) -> Vec<ResourceRef> {
        self.key.references()
    }
}

/// Upstream resources embedded in a key.
pub trait KeyReferences {
    fn references(&self) -> Vec<ResourceRef>;
}
