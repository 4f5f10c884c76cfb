/// The caller on whose behalf an operation runs.
///
/// Every service method takes `&Principal` explicitly. There is no implicit
/// or thread-local identity anywhere in the registry. What the roles permit
/// is decided by the configured [`Authorizer`](crate::authz::Authorizer).
#[derive(Debug, Clone)]
pub struct Principal {
    pub actor_id: String,
    pub roles: Vec<String>,
}

impl Principal {
    /// Construct explicitly for in-process callers.
    /// Caller is responsible for populating roles correctly.
    pub fn in_process(actor_id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            roles,
        }
    }

    /// Administrative identity for in-process tooling.
    pub fn system() -> Self {
        Self::in_process("system", vec!["admin".into()])
    }
}
