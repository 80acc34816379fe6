pub mod builder;
mod cache_layer;
pub mod error;
pub mod metrics;
pub mod service;

pub use builder::DocumentServiceBuilder;
pub use error::ServiceError;
pub use metrics::{MetricsSnapshot, ServiceMetrics};
pub use service::{DEFAULT_CACHE_TTL, DocumentService, FetchedDocument};
