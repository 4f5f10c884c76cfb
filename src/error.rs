use thiserror::Error;

use crate::model::EntityKind;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("can't create {kind} {key} because it already exists")]
    AlreadyExists { kind: EntityKind, key: String },

    #[error("can't update {kind} {key} because it doesn't exist")]
    NotFound { kind: EntityKind, key: String },

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("{resource_kind} {resource_key} is used in {dependent_kind}: {dependent_key}")]
    ResourceInUse {
        resource_kind: EntityKind,
        resource_key: String,
        dependent_kind: EntityKind,
        dependent_key: String,
    },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Storage port failures, passed through untouched.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl RegistryError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::AlreadyExists { .. } => 409,
            Self::NotFound { .. } => 404,
            Self::ValidationFailed(_) => 422,
            Self::ResourceInUse { .. } => 409,
            Self::Unauthorized(_) => 403,
            Self::Storage(_) => 500,
        }
    }

    /// Dependent that blocked a delete, if this is a `ResourceInUse`.
    pub fn blocking_dependent(&self) -> Option<(EntityKind, &str)> {
        match self {
            Self::ResourceInUse {
                dependent_kind,
                dependent_key,
                ..
            } => Some((*dependent_kind, dependent_key.as_str())),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
