//! Tracing setup for binaries and test harnesses embedding the registry.

use tracing_subscriber::EnvFilter;

use crate::config::RegistryConfig;

/// Install a fmt subscriber. `RUST_LOG` wins over the configured filter.
///
/// Returns `false` if a global subscriber was already installed, which is
/// not an error: the embedding application owns logging in that case.
pub fn init_tracing(config: &RegistryConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
