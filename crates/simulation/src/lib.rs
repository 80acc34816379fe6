//! DocVault Simulation Framework
//!
//! Drives a [`DocumentService`](docvault_service::DocumentService) over
//! in-memory stores and injects store failures to exercise rollback and
//! cache-degradation paths.
//!
//! ```no_run
//! use bytes::Bytes;
//! use docvault_core::DocumentDraft;
//! use docvault_simulation::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let harness = SimulationHarness::start().unwrap();
//!     let alice = harness.requester("alice").unwrap();
//!
//!     harness.fail(StoreOp::MetadataCreate, FailureType::Connection("down".into()));
//!     let result = harness
//!         .service()
//!         .upload(&alice, DocumentDraft::file("a.txt", "text/plain"), Bytes::from_static(b"a"))
//!         .await;
//!
//!     result.assert_internal();
//!     assert_eq!(harness.blob_count(), 0, "blob was rolled back");
//! }
//! ```

pub mod assertions;
mod error;
pub mod failing;
pub mod harness;

pub use assertions::ServiceResultExt;
pub use error::SimulationError;
pub use failing::{
    FailingBlobStore, FailingCache, FailingMetadataStore, FailureSwitch, FailureType, StoreOp,
};
pub use harness::{DEFAULT_USERS, SimulationHarness, SimulationHarnessBuilder, init_test_tracing};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::assertions::ServiceResultExt;
    pub use crate::error::SimulationError;
    pub use crate::failing::{FailureSwitch, FailureType, StoreOp};
    pub use crate::harness::{SimulationHarness, SimulationHarnessBuilder, init_test_tracing};
}
