use thiserror::Error;

/// Errors raised while setting up or driving a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The harness could not build its document service.
    #[error("service error: {0}")]
    Service(#[from] docvault_service::ServiceError),

    /// A login was used that the harness never registered.
    #[error("unknown user: {0}")]
    UnknownUser(String),
}
