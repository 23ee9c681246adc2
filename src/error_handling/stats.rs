//! Failure statistics tracking.
//!
//! Thread-safe per-kind failure counters, used to summarize the outcome of a
//! concurrent dispatch.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::ErrorKind;

/// Thread-safe failure statistics tracker.
///
/// Every `ErrorKind` is initialized to zero on creation, so counters can be
/// incremented from many tasks through a shared reference.
pub struct FailureStats {
    errors: HashMap<ErrorKind, AtomicUsize>,
}

impl FailureStats {
    /// Creates a tracker with every counter at zero.
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for kind in ErrorKind::iter() {
            errors.insert(kind, AtomicUsize::new(0));
        }
        FailureStats { errors }
    }

    /// Increment the counter for an error kind.
    pub fn increment(&self, kind: ErrorKind) {
        if let Some(counter) = self.errors.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment failure counter for {:?} which is not in the map",
                kind
            );
        }
    }

    /// Get the count for an error kind.
    pub fn get_count(&self, kind: ErrorKind) -> usize {
        self.errors
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Sum of every counter.
    pub fn total(&self) -> usize {
        self.errors.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Non-zero counters, in declaration order of `ErrorKind`.
    pub fn non_zero(&self) -> Vec<(ErrorKind, usize)> {
        ErrorKind::iter()
            .map(|kind| (kind, self.get_count(kind)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    /// Logs a one-line-per-kind breakdown at `warn` level.
    pub fn log_summary(&self, context: &str) {
        for (kind, count) in self.non_zero() {
            log::warn!("{context}: {count} x {kind}");
        }
    }
}

impl Default for FailureStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_stats_initialization() {
        let stats = FailureStats::new();
        for kind in ErrorKind::iter() {
            assert_eq!(stats.get_count(kind), 0);
        }
        assert_eq!(stats.total(), 0);
        assert!(stats.non_zero().is_empty());
    }

    #[test]
    fn test_failure_stats_increment() {
        let stats = FailureStats::new();
        stats.increment(ErrorKind::TransportFailure);
        stats.increment(ErrorKind::TransportFailure);
        stats.increment(ErrorKind::TaskFailed);

        assert_eq!(stats.get_count(ErrorKind::TransportFailure), 2);
        assert_eq!(stats.get_count(ErrorKind::TaskFailed), 1);
        assert_eq!(stats.total(), 3);
        assert_eq!(
            stats.non_zero(),
            vec![(ErrorKind::TransportFailure, 2), (ErrorKind::TaskFailed, 1)]
        );
    }

    #[test]
    fn test_failure_stats_concurrent_increments() {
        use std::sync::Arc;

        let stats = Arc::new(FailureStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        stats.increment(ErrorKind::IncompleteFetchResult);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread should not panic");
        }
        assert_eq!(stats.get_count(ErrorKind::IncompleteFetchResult), 800);
    }
}
