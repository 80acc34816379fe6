use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;
use crate::error::BootstrapError;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. Fails if the format is
/// unknown or a subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), BootstrapError> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format.as_str() {
        "pretty" => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        other => {
            return Err(BootstrapError::Config(format!(
                "unsupported log format: {other} (expected \"pretty\" or \"json\")"
            )));
        }
    };
    result.map_err(|e| BootstrapError::Config(format!("tracing already initialized: {e}")))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, BootstrapError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| BootstrapError::Config(format!("invalid log level {:?}: {e}", config.level))),
    }
}
