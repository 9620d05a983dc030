//! Process-wide `tracing` subscriber setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::{ConfigError, LogFormat, LoggingConfig};

/// Installs a fmt subscriber for `config`. `RUST_LOG` takes precedence over
/// the configured level.
///
/// Returns `false` when a global subscriber was already installed, which
/// leaves the existing one in place.
pub fn init_logging(config: &LoggingConfig) -> Result<bool, ConfigError> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(false))
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .try_init(),
    };

    Ok(installed.is_ok())
}

fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|error| {
            ConfigError::invalid(format!(
                "invalid logging.level `{}`: {error}",
                config.level
            ))
        }),
    }
}
