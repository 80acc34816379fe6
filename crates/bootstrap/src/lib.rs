//! Wiring for a DocVault deployment: TOML configuration, backend factories
//! and tracing initialization.

pub mod config;
pub mod error;
pub mod factory;
pub mod telemetry;

pub use config::DocVaultConfig;
pub use error::BootstrapError;
pub use factory::build_service;
