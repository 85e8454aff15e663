//! Aggregate counters for one dispatcher run
//!
//! Created fresh per run; the only shared mutable state besides the
//! admission semaphore.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Success/failure counters plus an in-flight gauge
#[derive(Debug, Default)]
pub struct RunCounters {
    success_count: AtomicU64,
    failure_count: AtomicU64,
    completed: AtomicU64,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl RunCounters {
    /// Create new counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Get success count
    pub fn success_count(&self) -> u64 {
        self.success_count.load(Ordering::Acquire)
    }

    /// Increment success count, returning the new completed total
    pub fn inc_success(&self) -> u64 {
        self.success_count.fetch_add(1, Ordering::AcqRel);
        self.complete()
    }

    /// Get failure count
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Acquire)
    }

    /// Increment failure count, returning the new completed total
    pub fn inc_failure(&self) -> u64 {
        self.failure_count.fetch_add(1, Ordering::AcqRel);
        self.complete()
    }

    // Each caller sees a distinct completed total.
    fn complete(&self) -> u64 {
        self.completed.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Units currently executing a call
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Highest in-flight value seen during the run
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Acquire)
    }

    /// Mark one unit as executing until the guard drops
    ///
    /// Also moves the exported `batch_search_in_flight` gauge, so the gauge
    /// returns to its previous value once every guard is gone.
    pub fn enter(&self) -> InFlightGuard<'_> {
        let entered_at = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(entered_at, Ordering::AcqRel);
        observability::record_unit_entered();
        InFlightGuard {
            counters: self,
            entered_at,
        }
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            success_count: self.success_count(),
            failure_count: self.failure_count(),
            in_flight: self.in_flight(),
            peak_in_flight: self.peak_in_flight(),
        }
    }
}

/// Decrements the in-flight gauge on drop, including on unwind
pub struct InFlightGuard<'a> {
    counters: &'a RunCounters,
    entered_at: usize,
}

impl InFlightGuard<'_> {
    /// In-flight value right after this unit entered
    pub fn entered_at(&self) -> usize {
        self.entered_at
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.counters.in_flight.fetch_sub(1, Ordering::AcqRel);
        observability::record_unit_left();
    }
}

/// Snapshot of run counters (for reporting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub success_count: u64,
    pub failure_count: u64,
    pub in_flight: usize,
    pub peak_in_flight: usize,
}

impl CountersSnapshot {
    pub fn completed(&self) -> u64 {
        self.success_count + self.failure_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counts() {
        let counters = RunCounters::new();
        assert_eq!(counters.inc_success(), 1);
        assert_eq!(counters.inc_failure(), 2);
        assert_eq!(counters.inc_failure(), 3);

        let snap = counters.snapshot();
        assert_eq!(snap.success_count, 1);
        assert_eq!(snap.failure_count, 2);
        assert_eq!(snap.completed(), 3);
    }

    #[test]
    fn test_completed_totals_are_unique_across_threads() {
        let counters = Arc::new(RunCounters::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let counters = Arc::clone(&counters);
                std::thread::spawn(move || {
                    (0..250)
                        .map(|i| {
                            if (t + i) % 2 == 0 {
                                counters.inc_success()
                            } else {
                                counters.inc_failure()
                            }
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        seen.sort_unstable();

        // Every total from 1 to 2000 observed exactly once, so each
        // progress milestone fires once
        assert_eq!(seen, (1..=2000).collect::<Vec<u64>>());
        assert_eq!(counters.snapshot().completed(), 2000);
    }

    #[test]
    fn test_in_flight_guard() {
        let counters = RunCounters::new();
        {
            let a = counters.enter();
            let b = counters.enter();
            assert_eq!(a.entered_at(), 1);
            assert_eq!(b.entered_at(), 2);
            drop(b);
            assert_eq!(a.entered_at(), 1);
            assert_eq!(counters.in_flight(), 1);
        }
        assert_eq!(counters.in_flight(), 0);
        assert_eq!(counters.peak_in_flight(), 2);
    }
}
