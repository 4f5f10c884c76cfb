//! Dependent tables per shared resource. Order of `with_dependents` calls is
//! check order and decides which dependent a blocked delete reports.

use super::rules;
use super::IntegrityEngine;
use crate::model::{DomainKey, InfrastructureKey, SchemaKey, StreamBindingKey, StreamKey, ZoneKey};
use crate::registry::Views;

pub fn zone_integrity(views: &Views) -> IntegrityEngine<ZoneKey> {
    IntegrityEngine::new()
        .with_dependents(views.stream_bindings.clone(), rules::stream_binding_in_zone)
        .with_dependents(views.consumer_bindings.clone(), rules::consumer_binding_in_zone)
        .with_dependents(views.producer_bindings.clone(), rules::producer_binding_in_zone)
        .with_dependents(views.process_bindings.clone(), rules::process_binding_in_zone)
        .with_dependents(views.processes.clone(), rules::process_in_zone)
        .with_dependents(views.infrastructure.clone(), rules::infrastructure_in_zone)
}

pub fn domain_integrity(views: &Views) -> IntegrityEngine<DomainKey> {
    IntegrityEngine::new()
        .with_dependents(views.schemas.clone(), rules::schema_in_domain)
        .with_dependents(views.streams.clone(), rules::stream_in_domain)
        .with_dependents(views.processes.clone(), rules::process_in_domain)
        .with_dependents(views.process_bindings.clone(), rules::process_binding_in_domain)
}

pub fn schema_integrity(views: &Views) -> IntegrityEngine<SchemaKey> {
    IntegrityEngine::new().with_dependents(views.streams.clone(), rules::stream_uses_schema)
}

pub fn stream_integrity(views: &Views) -> IntegrityEngine<StreamKey> {
    IntegrityEngine::new()
        .with_dependents(views.stream_bindings.clone(), rules::stream_binding_of_stream)
        .with_dependents(views.producers.clone(), rules::producer_of_stream)
        .with_dependents(views.consumers.clone(), rules::consumer_of_stream)
        .with_dependents(views.processes.clone(), rules::process_uses_stream)
}

pub fn infrastructure_integrity(views: &Views) -> IntegrityEngine<InfrastructureKey> {
    IntegrityEngine::new()
        .with_dependents(
            views.stream_bindings.clone(),
            rules::stream_binding_on_infrastructure,
        )
        .with_dependents(
            views.producer_bindings.clone(),
            rules::producer_binding_on_infrastructure,
        )
        .with_dependents(
            views.consumer_bindings.clone(),
            rules::consumer_binding_on_infrastructure,
        )
}

pub fn stream_binding_integrity(views: &Views) -> IntegrityEngine<StreamBindingKey> {
    IntegrityEngine::new().with_dependents(
        views.process_bindings.clone(),
        rules::process_binding_uses_stream_binding,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;
    use crate::registry::Registry;

    #[test]
    fn zone_dependents_are_checked_in_fixed_order() {
        let registry = Registry::in_memory();
        assert_eq!(
            zone_integrity(registry.views()).dependent_kinds(),
            vec![
                EntityKind::StreamBinding,
                EntityKind::ConsumerBinding,
                EntityKind::ProducerBinding,
                EntityKind::ProcessBinding,
                EntityKind::Process,
                EntityKind::Infrastructure,
            ]
        );
    }

    #[test]
    fn stream_dependents_cover_bindings_clients_and_processes() {
        let registry = Registry::in_memory();
        assert_eq!(
            stream_integrity(registry.views()).dependent_kinds(),
            vec![
                EntityKind::StreamBinding,
                EntityKind::Producer,
                EntityKind::Consumer,
                EntityKind::Process,
            ]
        );
    }
}
