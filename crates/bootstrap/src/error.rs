use thiserror::Error;

/// Errors raised while loading configuration or constructing backends.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// A configuration value is missing, unsupported, or inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// The configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for [`DocVaultConfig`](crate::DocVaultConfig).
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The service builder rejected the assembled components.
    #[error("service error: {0}")]
    Service(#[from] docvault_service::ServiceError),
}
