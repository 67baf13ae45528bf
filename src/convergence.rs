// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::grid::RelaxGrid;

/// Outcome of a completed sweep, as published by the combining worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStatus {
    /// The field has not converged; workers run another sweep.
    Continue,
    /// The latest sweep's largest change is at or below the threshold.
    Converged,
    /// The sweep cap was reached before the field converged.
    LimitReached {
        /// The cap that was hit.
        limit: u64,
    },
}

struct Decision {
    status: SweepStatus,
    max_delta: f64,
    sweeps: u64,
}

/// Shared per-sweep convergence state for a team of workers.
///
/// Each worker owns one local-delta slot: slot `i` is written only by
/// worker `i`, once per sweep, before the team's first barrier. After that
/// barrier a single designated worker calls
/// [`ConvergenceTracker::combine_and_swap`], which merges the slots into
/// the sweep's global maximum change, decides whether the team stops, and
/// flips the grid's planes, all while holding the decision lock. The rest
/// of the team reads the published decision through
/// [`ConvergenceTracker::status`] only after the second barrier.
///
/// Slot accesses use `Ordering::Relaxed`; the barriers on either side of
/// the combine step provide the cross-thread ordering.
pub struct ConvergenceTracker {
    threshold: f64,
    max_sweeps: Option<u64>,
    local_max: Box<[AtomicU64]>,
    decision: Mutex<Decision>,
}

impl ConvergenceTracker {
    /// Create a tracker for `workers` delta slots.
    ///
    /// `threshold` is the stop level for the merged per-sweep maximum
    /// change; `max_sweeps` optionally caps the number of sweeps.
    pub fn new(workers: usize, threshold: f64, max_sweeps: Option<u64>) -> Self {
        assert!(workers > 0, "ConvergenceTracker requires at least one worker");
        let local_max: Box<[AtomicU64]> = (0..workers)
            .map(|_| AtomicU64::new(0.0_f64.to_bits()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        ConvergenceTracker {
            threshold,
            max_sweeps,
            local_max,
            decision: Mutex::new(Decision {
                status: SweepStatus::Continue,
                max_delta: f64::INFINITY,
                sweeps: 0,
            }),
        }
    }

    /// Number of delta slots (one per worker).
    pub fn workers(&self) -> usize {
        self.local_max.len()
    }

    /// Record worker `worker`'s largest change for the current sweep.
    /// Must happen before the sweep's first barrier.
    pub fn record_local(&self, worker: usize, delta: f64) {
        self.local_max[worker].store(delta.to_bits(), Ordering::Relaxed);
    }

    /// Merge all local deltas, publish the sweep's decision, and flip the
    /// grid planes, under the decision lock.
    ///
    /// Only the designated combining worker may call this, strictly
    /// between the sweep's two barriers. Returns the decision it
    /// published.
    pub fn combine_and_swap(&self, grid: &RelaxGrid) -> SweepStatus {
        let mut merged = 0.0_f64;
        for slot in self.local_max.iter() {
            let delta = f64::from_bits(slot.load(Ordering::Relaxed));
            if delta > merged {
                merged = delta;
            }
        }

        let mut decision = self.decision.lock().unwrap();
        decision.sweeps += 1;
        decision.max_delta = merged;
        decision.status = if merged <= self.threshold {
            SweepStatus::Converged
        } else {
            match self.max_sweeps {
                Some(limit) if decision.sweeps >= limit => SweepStatus::LimitReached { limit },
                _ => SweepStatus::Continue,
            }
        };
        grid.swap();
        decision.status
    }

    /// The decision published by the most recent combine step.
    pub fn status(&self) -> SweepStatus {
        self.decision.lock().unwrap().status
    }

    /// Merged maximum change from the most recent completed sweep.
    pub fn max_delta(&self) -> f64 {
        self.decision.lock().unwrap().max_delta
    }

    /// Number of completed sweeps.
    pub fn sweeps(&self) -> u64 {
        self.decision.lock().unwrap().sweeps
    }
}
