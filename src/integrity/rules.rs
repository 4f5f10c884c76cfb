//! Reference rules: does a dependent entity use a given resource?
//!
//! Pure functions over keys and desired-state relations. Storage is never
//! consulted, so a rule only sees what the dependent itself records.

use crate::model::{
    Consumer, ConsumerBinding, DomainKey, Infrastructure, InfrastructureKey, Process,
    ProcessBinding, Producer, ProducerBinding, Schema, SchemaKey, Stream, StreamBinding,
    StreamBindingKey, StreamKey, ZoneKey,
};

// ── Zone ─────────────────────────────────────────────────────

pub fn stream_binding_in_zone(binding: &StreamBinding, zone: &ZoneKey) -> bool {
    binding.key.zone() == zone
}

pub fn consumer_binding_in_zone(binding: &ConsumerBinding, zone: &ZoneKey) -> bool {
    binding.key.consumer.zone == *zone
}

pub fn producer_binding_in_zone(binding: &ProducerBinding, zone: &ZoneKey) -> bool {
    binding.key.producer.zone == *zone
}

/// A process binding uses a zone through its own key or through any input
/// or output stream binding's infrastructure.
pub fn process_binding_in_zone(binding: &ProcessBinding, zone: &ZoneKey) -> bool {
    binding.key.zone == *zone
        || binding
            .outputs
            .iter()
            .any(|output| output.stream_binding.zone() == zone)
        || binding
            .inputs
            .iter()
            .any(|input| input.stream_binding.zone() == zone)
}

pub fn process_in_zone(process: &Process, zone: &ZoneKey) -> bool {
    process.zones.contains(zone)
}

pub fn infrastructure_in_zone(infrastructure: &Infrastructure, zone: &ZoneKey) -> bool {
    infrastructure.key.zone == *zone
}

// ── Domain ───────────────────────────────────────────────────

pub fn schema_in_domain(schema: &Schema, domain: &DomainKey) -> bool {
    schema.key.domain == *domain
}

pub fn stream_in_domain(stream: &Stream, domain: &DomainKey) -> bool {
    stream.key.domain == *domain
}

pub fn process_in_domain(process: &Process, domain: &DomainKey) -> bool {
    process.key.domain == *domain
}

pub fn process_binding_in_domain(binding: &ProcessBinding, domain: &DomainKey) -> bool {
    binding.key.domain == *domain
}

// ── Schema ───────────────────────────────────────────────────

pub fn stream_uses_schema(stream: &Stream, schema: &SchemaKey) -> bool {
    stream.schema == *schema
}

// ── Stream ───────────────────────────────────────────────────

pub fn stream_binding_of_stream(binding: &StreamBinding, stream: &StreamKey) -> bool {
    binding.key.stream == *stream
}

pub fn producer_of_stream(producer: &Producer, stream: &StreamKey) -> bool {
    producer.key.stream == *stream
}

pub fn consumer_of_stream(consumer: &Consumer, stream: &StreamKey) -> bool {
    consumer.key.stream == *stream
}

pub fn process_uses_stream(process: &Process, stream: &StreamKey) -> bool {
    process.streams().any(|s| s == stream)
}

// ── Infrastructure ───────────────────────────────────────────

pub fn stream_binding_on_infrastructure(
    binding: &StreamBinding,
    infrastructure: &InfrastructureKey,
) -> bool {
    binding.key.infrastructure == *infrastructure
}

pub fn producer_binding_on_infrastructure(
    binding: &ProducerBinding,
    infrastructure: &InfrastructureKey,
) -> bool {
    binding.key.infrastructure() == *infrastructure
}

pub fn consumer_binding_on_infrastructure(
    binding: &ConsumerBinding,
    infrastructure: &InfrastructureKey,
) -> bool {
    binding.key.infrastructure() == *infrastructure
}

// ── Stream binding ───────────────────────────────────────────

pub fn process_binding_uses_stream_binding(
    binding: &ProcessBinding,
    stream_binding: &StreamBindingKey,
) -> bool {
    binding.stream_bindings().any(|sb| sb == stream_binding)
}
