//! Authorization collaborator and the guard that applies it at each
//! operation boundary.
//!
//! - Writes are pre-authorized: a deny fails the call with `Unauthorized`.
//! - `get` is post-authorized: a deny turns the result into `None`.
//! - `find_all` is post-filtered: denied entities are omitted.
//!
//! Reads never surface a deny as an error.

use std::sync::Arc;

use strum::{AsRefStr, Display};

use crate::error::{RegistryError, Result};
use crate::model::{EntityKind, RegistryEntity};
use crate::principal::Principal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Create,
    Update,
    UpdateStatus,
    Delete,
    Read,
}

/// What an action is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTarget {
    pub kind: EntityKind,
    pub key: String,
}

impl AccessTarget {
    pub fn of<E: RegistryEntity>(entity: &E) -> Self {
        Self {
            kind: E::KIND,
            key: entity.key().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny { reason: String },
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Permission source. Must be pure with respect to registry state.
pub trait Authorizer: Send + Sync {
    fn decide(&self, principal: &Principal, action: Action, target: &AccessTarget)
        -> AccessDecision;
}

// ── Authorizers ──────────────────────────────────────────────

/// Allows everything. For embedded use where the caller already decided.
pub struct PermitAll;

impl Authorizer for PermitAll {
    fn decide(&self, _: &Principal, _: Action, _: &AccessTarget) -> AccessDecision {
        AccessDecision::Allow
    }
}

/// Static role table.
/// - `admin`: every action on every kind
/// - `editor`: every action except on platform kinds (zone, infrastructure),
///   which it may only read
/// - `operator`: UPDATE_STATUS and READ
/// - `viewer` / other: READ only for `viewer`, nothing otherwise
pub struct RoleBasedAuthorizer;

impl RoleBasedAuthorizer {
    fn is_platform_kind(kind: EntityKind) -> bool {
        matches!(kind, EntityKind::Zone | EntityKind::Infrastructure)
    }

    fn role_allows(role: &str, action: Action, kind: EntityKind) -> bool {
        match role {
            "admin" => true,
            "editor" => action == Action::Read || !Self::is_platform_kind(kind),
            "operator" => matches!(action, Action::UpdateStatus | Action::Read),
            "viewer" => action == Action::Read,
            _ => false,
        }
    }
}

impl Authorizer for RoleBasedAuthorizer {
    fn decide(
        &self,
        principal: &Principal,
        action: Action,
        target: &AccessTarget,
    ) -> AccessDecision {
        // An actor only needs ONE role that permits the operation.
        if principal
            .roles
            .iter()
            .any(|role| Self::role_allows(role, action, target.kind))
        {
            AccessDecision::Allow
        } else {
            AccessDecision::Deny {
                reason: format!(
                    "actor '{}' with roles {:?} may not {} {} {}",
                    principal.actor_id, principal.roles, action, target.kind, target.key
                ),
            }
        }
    }
}

// ── Guard ────────────────────────────────────────────────────

/// Applies an [`Authorizer`] around service operations.
#[derive(Clone)]
pub struct Guard {
    authorizer: Arc<dyn Authorizer>,
}

impl Guard {
    pub fn new(authorizer: Arc<dyn Authorizer>) -> Self {
        Self { authorizer }
    }

    pub fn permit_all() -> Self {
        Self::new(Arc::new(PermitAll))
    }

    pub fn permits<E: RegistryEntity>(
        &self,
        principal: &Principal,
        action: Action,
        entity: &E,
    ) -> bool {
        self.authorizer
            .decide(principal, action, &AccessTarget::of(entity))
            .is_allowed()
    }

    /// Fail the operation before it touches anything.
    pub fn pre_authorize<E: RegistryEntity>(
        &self,
        principal: &Principal,
        action: Action,
        entity: &E,
    ) -> Result<()> {
        match self
            .authorizer
            .decide(principal, action, &AccessTarget::of(entity))
        {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Deny { reason } => {
                tracing::debug!(
                    actor = %principal.actor_id,
                    %action,
                    kind = %E::KIND,
                    key = %entity.key(),
                    "access denied"
                );
                Err(RegistryError::Unauthorized(reason))
            }
        }
    }

    /// Hide a single read result the principal may not see.
    pub fn post_authorize<E: RegistryEntity>(
        &self,
        principal: &Principal,
        found: Option<E>,
    ) -> Option<E> {
        found.filter(|entity| self.permits(principal, Action::Read, entity))
    }

    /// Drop every read result the principal may not see, keeping order.
    pub fn post_filter<E: RegistryEntity>(
        &self,
        principal: &Principal,
        entities: impl IntoIterator<Item = E>,
    ) -> Vec<E> {
        entities
            .into_iter()
            .filter(|entity| self.permits(principal, Action::Read, entity))
            .collect()
    }
}

impl std::fmt::Debug for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Specification, Stream, StreamKey, DomainKey, SchemaKey, Zone, ZoneKey};

    fn zone() -> Zone {
        Zone::new(ZoneKey::new("z1"), Specification::of_type("default"))
    }

    fn stream() -> Stream {
        let domain = DomainKey::new("d");
        Stream::new(
            StreamKey::new(domain.clone(), "s", 1),
            Specification::of_type("default"),
            SchemaKey::new(domain, "s_v1"),
        )
    }

    fn role_guard() -> Guard {
        Guard::new(Arc::new(RoleBasedAuthorizer))
    }

    #[test]
    fn action_display_matches_permission_names() {
        assert_eq!(Action::UpdateStatus.to_string(), "UPDATE_STATUS");
        assert_eq!(Action::Create.as_ref(), "CREATE");
    }

    #[test]
    fn admin_may_do_anything() {
        let admin = Principal::in_process("root", vec!["admin".into()]);
        assert!(role_guard()
            .pre_authorize(&admin, Action::Delete, &zone())
            .is_ok());
    }

    #[test]
    fn editor_may_not_touch_platform_kinds() {
        let editor = Principal::in_process("e", vec!["editor".into()]);
        let guard = role_guard();
        assert!(guard.pre_authorize(&editor, Action::Create, &stream()).is_ok());
        let err = guard
            .pre_authorize(&editor, Action::Create, &zone())
            .unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized(_)));
        assert!(guard.permits(&editor, Action::Read, &zone()));
    }

    #[test]
    fn operator_may_only_report_status() {
        let operator = Principal::in_process("agent", vec!["operator".into()]);
        let guard = role_guard();
        assert!(guard.permits(&operator, Action::UpdateStatus, &stream()));
        assert!(!guard.permits(&operator, Action::Update, &stream()));
    }

    #[test]
    fn post_authorize_hides_denied_reads() {
        let nobody = Principal::in_process("anon", vec![]);
        assert!(role_guard().post_authorize(&nobody, Some(zone())).is_none());
    }

    #[test]
    fn post_filter_keeps_order() {
        let viewer = Principal::in_process("v", vec!["viewer".into()]);
        let zones = vec![
            Zone::new(ZoneKey::new("b"), Specification::of_type("default")),
            Zone::new(ZoneKey::new("a"), Specification::of_type("default")),
        ];
        let names: Vec<_> = role_guard()
            .post_filter(&viewer, zones)
            .into_iter()
            .map(|z| z.key.name)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn deny_reason_names_actor_and_target() {
        let decision = RoleBasedAuthorizer.decide(
            &Principal::in_process("anon", vec![]),
            Action::Delete,
            &AccessTarget::of(&zone()),
        );
        match decision {
            AccessDecision::Deny { reason } => {
                assert!(reason.contains("anon"));
                assert!(reason.contains("DELETE zone z1"));
            }
            other => panic!("Expected Deny, got {other:?}"),
        }
    }
}
