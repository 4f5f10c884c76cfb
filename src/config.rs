//! Registry configuration.
//!
//! Reads from environment variables (a `.env` file is loaded first if present):
//!   STREAM_REGISTRY_SERIALIZE_WRITES per-key write locks (default: true)
//!   STREAM_REGISTRY_AUTHORIZATION    `role_based` (default) or `permit_all`
//!   STREAM_REGISTRY_LOG              fallback log filter when RUST_LOG is unset

use std::str::FromStr;
use std::sync::Arc;

use strum::{Display, EnumString};

use crate::authz::{Authorizer, Guard, PermitAll, RoleBasedAuthorizer};

pub const SERIALIZE_WRITES_VAR: &str = "STREAM_REGISTRY_SERIALIZE_WRITES";
pub const AUTHORIZATION_VAR: &str = "STREAM_REGISTRY_AUTHORIZATION";
pub const LOG_VAR: &str = "STREAM_REGISTRY_LOG";

pub const DEFAULT_LOG_FILTER: &str = "info,stream_registry=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: expected a boolean, got '{value}'")]
    InvalidBool { var: &'static str, value: String },

    #[error("{var}: unknown authorization mode '{value}' (expected role_based or permit_all)")]
    UnknownAuthorization { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum AuthorizationMode {
    PermitAll,
    #[default]
    RoleBased,
}

impl AuthorizationMode {
    pub fn authorizer(self) -> Arc<dyn Authorizer> {
        match self {
            Self::PermitAll => Arc::new(PermitAll),
            Self::RoleBased => Arc::new(RoleBasedAuthorizer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Serialize writes per key and hold resource locks across
    /// scan-then-delete. Off reproduces unguarded last-write-wins.
    pub serialize_writes: bool,
    pub authorization: AuthorizationMode,
    pub log_filter: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            serialize_writes: true,
            authorization: AuthorizationMode::default(),
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

impl RegistryConfig {
    /// Load `.env` (if any), then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Unset variables keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(SERIALIZE_WRITES_VAR) {
            config.serialize_writes = parse_bool(SERIALIZE_WRITES_VAR, &value)?;
        }
        if let Some(value) = lookup(AUTHORIZATION_VAR) {
            config.authorization = AuthorizationMode::from_str(value.trim()).map_err(|_| {
                ConfigError::UnknownAuthorization {
                    var: AUTHORIZATION_VAR,
                    value,
                }
            })?;
        }
        if let Some(value) = lookup(LOG_VAR).filter(|v| !v.trim().is_empty()) {
            config.log_filter = value;
        }

        Ok(config)
    }

    pub fn guard(&self) -> Guard {
        Guard::new(self.authorization.authorizer())
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}
