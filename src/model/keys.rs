//! Structural keys. Composite keys embed their parents by value, so a
//! producer-binding key carries the producer key, which carries the zone key
//! and the stream key, and so on.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{EntityKey, EntityKind, KeyReferences, ResourceRef};

macro_rules! key_kind {
    ($key:ty, $kind:ident) => {
        impl EntityKey for $key {
            const KIND: EntityKind = EntityKind::$kind;
        }
    };
}

// ── Roots ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DomainKey {
    pub name: String,
}

impl DomainKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for DomainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl KeyReferences for DomainKey {
    fn references(&self) -> Vec<ResourceRef> {
        Vec::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneKey {
    pub name: String,
}

impl ZoneKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl KeyReferences for ZoneKey {
    fn references(&self) -> Vec<ResourceRef> {
        Vec::new()
    }
}

// ── Logical entities ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaKey {
    pub domain: DomainKey,
    pub name: String,
}

impl SchemaKey {
    pub fn new(domain: DomainKey, name: impl Into<String>) -> Self {
        Self {
            domain,
            name: name.into(),
        }
    }
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.domain, self.name)
    }
}

impl KeyReferences for SchemaKey {
    fn references(&self) -> Vec<ResourceRef> {
        vec![ResourceRef::of(&self.domain)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreamKey {
    pub domain: DomainKey,
    pub name: String,
    pub version: u32,
}

impl StreamKey {
    pub fn new(domain: DomainKey, name: impl Into<String>, version: u32) -> Self {
        Self {
            domain,
            name: name.into(),
            version,
        }
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:v{}", self.domain, self.name, self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InfrastructureKey {
    pub zone: ZoneKey,
    pub name: String,
}

impl InfrastructureKey {
    pub fn new(zone: ZoneKey, name: impl Into<String>) -> Self {
        Self {
            zone,
            name: name.into(),
        }
    }
}

impl fmt::Display for InfrastructureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.zone, self.name)
    }
}

impl KeyReferences for InfrastructureKey {
    fn references(&self) -> Vec<ResourceRef> {
        vec![ResourceRef::of(&self.zone)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProducerKey {
    pub stream: StreamKey,
    pub zone: ZoneKey,
    pub name: String,
}

impl ProducerKey {
    pub fn new(stream: StreamKey, zone: ZoneKey, name: impl Into<String>) -> Self {
        Self {
            stream,
            zone,
            name: name.into(),
        }
    }
}

impl fmt::Display for ProducerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}/{}", self.stream, self.zone, self.name)
    }
}

impl KeyReferences for ProducerKey {
    fn references(&self) -> Vec<ResourceRef> {
        vec![ResourceRef::of(&self.stream), ResourceRef::of(&self.zone)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConsumerKey {
    pub stream: StreamKey,
    pub zone: ZoneKey,
    pub name: String,
}

impl ConsumerKey {
    pub fn new(stream: StreamKey, zone: ZoneKey, name: impl Into<String>) -> Self {
        Self {
            stream,
            zone,
            name: name.into(),
        }
    }
}

impl fmt::Display for ConsumerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}/{}", self.stream, self.zone, self.name)
    }
}

impl KeyReferences for ConsumerKey {
    fn references(&self) -> Vec<ResourceRef> {
        vec![ResourceRef::of(&self.stream), ResourceRef::of(&self.zone)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessKey {
    pub domain: DomainKey,
    pub name: String,
}

impl ProcessKey {
    pub fn new(domain: DomainKey, name: impl Into<String>) -> Self {
        Self {
            domain,
            name: name.into(),
        }
    }
}

impl fmt::Display for ProcessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.domain, self.name)
    }
}

// ── Bindings ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreamBindingKey {
    pub stream: StreamKey,
    pub infrastructure: InfrastructureKey,
}

impl StreamBindingKey {
    pub fn new(stream: StreamKey, infrastructure: InfrastructureKey) -> Self {
        Self {
            stream,
            infrastructure,
        }
    }

    pub fn zone(&self) -> &ZoneKey {
        &self.infrastructure.zone
    }
}

impl fmt::Display for StreamBindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.stream, self.infrastructure)
    }
}

impl KeyReferences for StreamBindingKey {
    fn references(&self) -> Vec<ResourceRef> {
        vec![
            ResourceRef::of(&self.stream),
            ResourceRef::of(&self.infrastructure),
            ResourceRef::of(self.zone()),
        ]
    }
}

/// The infrastructure of a producer binding lives in the producer's zone,
/// so only its name is carried.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProducerBindingKey {
    pub producer: ProducerKey,
    pub infrastructure_name: String,
}

impl ProducerBindingKey {
    pub fn new(producer: ProducerKey, infrastructure_name: impl Into<String>) -> Self {
        Self {
            producer,
            infrastructure_name: infrastructure_name.into(),
        }
    }

    pub fn infrastructure(&self) -> InfrastructureKey {
        InfrastructureKey::new(self.producer.zone.clone(), &self.infrastructure_name)
    }
}

impl fmt::Display for ProducerBindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.producer, self.infrastructure_name)
    }
}

impl KeyReferences for ProducerBindingKey {
    fn references(&self) -> Vec<ResourceRef> {
        vec![
            ResourceRef::of(&self.producer),
            ResourceRef::of(&self.infrastructure()),
            ResourceRef::of(&self.producer.zone),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConsumerBindingKey {
    pub consumer: ConsumerKey,
    pub infrastructure_name: String,
}

impl ConsumerBindingKey {
    pub fn new(consumer: ConsumerKey, infrastructure_name: impl Into<String>) -> Self {
        Self {
            consumer,
            infrastructure_name: infrastructure_name.into(),
        }
    }

    pub fn infrastructure(&self) -> InfrastructureKey {
        InfrastructureKey::new(self.consumer.zone.clone(), &self.infrastructure_name)
    }
}

impl fmt::Display for ConsumerBindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.consumer, self.infrastructure_name)
    }
}

impl KeyReferences for ConsumerBindingKey {
    fn references(&self) -> Vec<ResourceRef> {
        vec![
            ResourceRef::of(&self.consumer),
            ResourceRef::of(&self.infrastructure()),
            ResourceRef::of(&self.consumer.zone),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessBindingKey {
    pub domain: DomainKey,
    pub zone: ZoneKey,
    pub process_name: String,
}

impl ProcessBindingKey {
    pub fn new(domain: DomainKey, zone: ZoneKey, process_name: impl Into<String>) -> Self {
        Self {
            domain,
            zone,
            process_name: process_name.into(),
        }
    }

    pub fn process(&self) -> ProcessKey {
        ProcessKey::new(self.domain.clone(), &self.process_name)
    }
}

impl fmt::Display for ProcessBindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.domain, self.process_name, self.zone)
    }
}

key_kind!(DomainKey, Domain);
key_kind!(SchemaKey, Schema);
key_kind!(ZoneKey, Zone);
key_kind!(InfrastructureKey, Infrastructure);
key_kind!(StreamKey, Stream);
key_kind!(ProducerKey, Producer);
key_kind!(ConsumerKey, Consumer);
key_kind!(ProcessKey, Process);
key_kind!(StreamBindingKey, StreamBinding);
key_kind!(ProducerBindingKey, ProducerBinding);
key_kind!(ConsumerBindingKey, ConsumerBinding);
key_kind!(ProcessBindingKey, ProcessBinding);
