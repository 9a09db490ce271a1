//! Tracing setup: subscriber installation plus span and event definitions.

pub mod events;
pub mod spans;

use foresight_core::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted before the configured filter.
pub const LOG_ENV: &str = "FORESIGHT_LOG";

/// Install the global subscriber.
///
/// `FORESIGHT_LOG` wins over `config.log_filter`. Returns `false` when a
/// global subscriber was already installed, in which case nothing changes.
pub fn init_tracing(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    let installed = if config.json {
        builder
            .with_file(true)
            .with_line_number(true)
            .json()
            .try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}

/// Initialize tracing with an explicit filter string (for tests or embedding).
pub fn init_tracing_with_filter(filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .with_test_writer()
        .try_init()
        .is_ok()
}
