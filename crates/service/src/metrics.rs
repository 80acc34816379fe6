use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters tracking document service outcomes.
///
/// All counters use relaxed ordering. For a consistent point-in-time view,
/// call [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    /// Cache reads that returned a usable entry.
    pub cache_hits: AtomicU64,
    /// Cache reads that found nothing (including failed reads).
    pub cache_misses: AtomicU64,
    /// Cache operations that failed and were recovered locally.
    pub cache_errors: AtomicU64,
    /// Documents successfully uploaded.
    pub uploads: AtomicU64,
    /// Documents successfully deleted.
    pub deletes: AtomicU64,
    /// Grant sets successfully replaced.
    pub grants: AtomicU64,
    /// Operations rejected by an access check.
    pub forbidden: AtomicU64,
    /// Compensating deletes issued after a failed upload step.
    pub rollbacks: AtomicU64,
    /// Cache invalidations that failed.
    pub invalidation_failures: AtomicU64,
}

impl ServiceMetrics {
    pub fn increment_cache_hits(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cache_misses(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cache_errors(&self) {
        self.cache_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_uploads(&self) {
        self.uploads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_deletes(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_grants(&self) {
        self.grants.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_forbidden(&self) {
        self.forbidden.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rollbacks(&self) {
        self.rollbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_invalidation_failures(&self) {
        self.invalidation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cache_errors: self.cache_errors.load(Ordering::Relaxed),
            uploads: self.uploads.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            grants: self.grants.load(Ordering::Relaxed),
            forbidden: self.forbidden.load(Ordering::Relaxed),
            rollbacks: self.rollbacks.load(Ordering::Relaxed),
            invalidation_failures: self.invalidation_failures.load(Ordering::Relaxed),
        }
    }
}

/// A plain data snapshot of [`ServiceMetrics`] at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_errors: u64,
    pub uploads: u64,
    pub deletes: u64,
    pub grants: u64,
    pub forbidden: u64,
    pub rollbacks: u64,
    pub invalidation_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = ServiceMetrics::default();
        assert_eq!(m.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn increment_and_snapshot() {
        let m = ServiceMetrics::default();
        m.increment_cache_hits();
        m.increment_cache_hits();
        m.increment_cache_misses();
        m.increment_cache_errors();
        m.increment_uploads();
        m.increment_deletes();
        m.increment_grants();
        m.increment_forbidden();
        m.increment_rollbacks();
        m.increment_rollbacks();
        m.increment_invalidation_failures();

        let snap = m.snapshot();
        assert_eq!(snap.cache_hits, 2);
        assert_eq!(snap.cache_misses, 1);
        assert_eq!(snap.cache_errors, 1);
        assert_eq!(snap.uploads, 1);
        assert_eq!(snap.deletes, 1);
        assert_eq!(snap.grants, 1);
        assert_eq!(snap.forbidden, 1);
        assert_eq!(snap.rollbacks, 2);
        assert_eq!(snap.invalidation_failures, 1);
    }
}
