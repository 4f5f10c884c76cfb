use serde::{Deserialize, Serialize};

use super::{
    ConsumerBindingKey, ConsumerKey, DomainKey, InfrastructureKey, ProcessBindingKey, ProcessKey,
    ProducerBindingKey, ProducerKey, Record, RegistryEntity, ResourceRef, SchemaKey,
    Specification, Status, StreamBindingKey, StreamKey, ZoneKey,
};

pub type Domain = Record<DomainKey>;
pub type Schema = Record<SchemaKey>;
pub type Zone = Record<ZoneKey>;
pub type Infrastructure = Record<InfrastructureKey>;
pub type Producer = Record<ProducerKey>;
pub type Consumer = Record<ConsumerKey>;
pub type StreamBinding = Record<StreamBindingKey>;
pub type ProducerBinding = Record<ProducerBindingKey>;
pub type ConsumerBinding = Record<ConsumerBindingKey>;

macro_rules! entity_documents {
    () => {
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
    };
}

// ── Stream ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub key: StreamKey,
    pub specification: Specification,
    pub status: Option<Status>,
    pub schema: SchemaKey,
}

impl Stream {
    pub fn new(key: StreamKey, specification: Specification, schema: SchemaKey) -> Self {
        Self {
            key,
            specification,
            status: None,
            schema,
        }
    }
}

impl RegistryEntity for Stream {
    type Key = StreamKey;

    fn key(&self) -> &StreamKey {
        &self.key
    }

    entity_documents!();

    fn references(&self) -> Vec<ResourceRef> {
        vec![
            ResourceRef::of(&self.key.domain),
            ResourceRef::of(&self.schema),
        ]
    }
}

// ── Process ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInputStream {
    pub stream: StreamKey,
    #[serde(default)]
    pub configuration: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessOutputStream {
    pub stream: StreamKey,
    #[serde(default)]
    pub configuration: serde_json::Value,
}

/// A logical process, declared once and deployed into a set of zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub key: ProcessKey,
    pub specification: Specification,
    pub status: Option<Status>,
    pub zones: Vec<ZoneKey>,
    #[serde(default)]
    pub inputs: Vec<ProcessInputStream>,
    #[serde(default)]
    pub outputs: Vec<ProcessOutputStream>,
}

impl Process {
    pub fn new(key: ProcessKey, specification: Specification, zones: Vec<ZoneKey>) -> Self {
        Self {
            key,
            specification,
            status: None,
            zones,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_input(mut self, stream: StreamKey) -> Self {
        self.inputs.push(ProcessInputStream {
            stream,
            configuration: serde_json::Value::Null,
        });
        self
    }

    pub fn with_output(mut self, stream: StreamKey) -> Self {
        self.outputs.push(ProcessOutputStream {
            stream,
            configuration: serde_json::Value::Null,
        });
        self
    }

    pub fn streams(&self) -> impl Iterator<Item = &StreamKey> {
        self.inputs
            .iter()
            .map(|i| &i.stream)
            .chain(self.outputs.iter().map(|o| &o.stream))
    }
}

impl RegistryEntity for Process {
    type Key = ProcessKey;

    fn key(&self) -> &ProcessKey {
        &self.key
    }

    entity_documents!();

    fn references(&self) -> Vec<ResourceRef> {
        let mut refs = vec![ResourceRef::of(&self.key.domain)];
        refs.extend(self.zones.iter().map(ResourceRef::of));
        refs.extend(self.streams().map(ResourceRef::of));
        refs
    }
}

// ── Process binding ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInputStreamBinding {
    pub stream_binding: StreamBindingKey,
    #[serde(default)]
    pub configuration: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessOutputStreamBinding {
    pub stream_binding: StreamBindingKey,
    #[serde(default)]
    pub configuration: serde_json::Value,
}

/// A process realized in one zone. Its inputs and outputs are stream
/// bindings, which may sit in other zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessBinding {
    pub key: ProcessBindingKey,
    pub specification: Specification,
    pub status: Option<Status>,
    #[serde(default)]
    pub inputs: Vec<ProcessInputStreamBinding>,
    #[serde(default)]
    pub outputs: Vec<ProcessOutputStreamBinding>,
}

impl ProcessBinding {
    pub fn new(key: ProcessBindingKey, specification: Specification) -> Self {
        Self {
            key,
            specification,
            status: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_input(mut self, stream_binding: StreamBindingKey) -> Self {
        self.inputs.push(ProcessInputStreamBinding {
            stream_binding,
            configuration: serde_json::Value::Null,
        });
        self
    }

    pub fn with_output(mut self, stream_binding: StreamBindingKey) -> Self {
        self.outputs.push(ProcessOutputStreamBinding {
            stream_binding,
            configuration: serde_json::Value::Null,
        });
        self
    }

    pub fn stream_bindings(&self) -> impl Iterator<Item = &StreamBindingKey> {
        self.inputs
            .iter()
            .map(|i| &i.stream_binding)
            .chain(self.outputs.iter().map(|o| &o.stream_binding))
    }
}

impl RegistryEntity for ProcessBinding {
    type Key = ProcessBindingKey;

    fn key(&self) -> &ProcessBindingKey {
        &self.key
    }

    entity_documents!();

    fn references(&self) -> Vec<ResourceRef> {
        let mut refs = vec![
            ResourceRef::of(&self.key.domain),
            ResourceRef::of(&self.key.zone),
            ResourceRef::of(&self.key.process()),
        ];
        for binding in self.stream_bindings() {
            refs.push(ResourceRef::of(binding));
            refs.push(ResourceRef::of(binding.zone()));
        }
        refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;

    fn stream_binding(zone: &str) -> StreamBindingKey {
        StreamBindingKey::new(
            StreamKey::new(DomainKey::new("d"), "s", 1),
            InfrastructureKey::new(ZoneKey::new(zone), "kafka"),
        )
    }

    #[test]
    fn process_binding_references_output_zones() {
        let binding = ProcessBinding::new(
            ProcessBindingKey::new(DomainKey::new("d"), ZoneKey::new("z1"), "p"),
            Specification::of_type("default"),
        )
        .with_output(stream_binding("z2"));

        let zones: Vec<_> = binding
            .references()
            .into_iter()
            .filter(|r| r.kind == EntityKind::Zone)
            .map(|r| r.key)
            .collect();
        assert_eq!(zones, vec!["z1".to_string(), "z2".to_string()]);
    }

    #[test]
    fn process_streams_chain_inputs_then_outputs() {
        let input = StreamKey::new(DomainKey::new("d"), "in", 1);
        let output = StreamKey::new(DomainKey::new("d"), "out", 1);
        let process = Process::new(
            ProcessKey::new(DomainKey::new("d"), "p"),
            Specification::of_type("default"),
            vec![ZoneKey::new("z1")],
        )
        .with_input(input.clone())
        .with_output(output.clone());

        let streams: Vec<_> = process.streams().cloned().collect();
        assert_eq!(streams, vec![input, output]);
    }

    #[test]
    fn set_status_leaves_specification() {
        let mut zone = Zone::new(ZoneKey::new("z1"), Specification::of_type("default"));
        zone.set_status(Status::new(serde_json::json!({"healthy": true})));
        assert_eq!(zone.specification, Specification::of_type("default"));
        assert!(zone.status.is_some());
    }
}
