//! Assertion helpers for service results in simulation tests.

use std::fmt::Debug;

use docvault_service::ServiceError;

/// Assertions on the error class of a service call.
pub trait ServiceResultExt {
    /// Assert the call succeeded.
    fn assert_ok(&self);

    /// Assert the call failed with `NotFound`.
    fn assert_not_found(&self);

    /// Assert the call failed with `Forbidden`.
    fn assert_forbidden(&self);

    /// Assert the call failed with `InvalidParams`.
    fn assert_invalid_params(&self);

    /// Assert the call failed with `Internal`.
    fn assert_internal(&self);
}

impl<T: Debug> ServiceResultExt for Result<T, ServiceError> {
    fn assert_ok(&self) {
        assert!(self.is_ok(), "expected Ok, got {self:?}");
    }

    fn assert_not_found(&self) {
        assert!(
            matches!(self, Err(ServiceError::NotFound(_))),
            "expected NotFound, got {self:?}"
        );
    }

    fn assert_forbidden(&self) {
        assert!(
            matches!(self, Err(ServiceError::Forbidden(_))),
            "expected Forbidden, got {self:?}"
        );
    }

    fn assert_invalid_params(&self) {
        assert!(
            matches!(self, Err(ServiceError::InvalidParams(_))),
            "expected InvalidParams, got {self:?}"
        );
    }

    fn assert_internal(&self) {
        assert!(
            matches!(self, Err(ServiceError::Internal(_))),
            "expected Internal, got {self:?}"
        );
    }
}
