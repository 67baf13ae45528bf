// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::time::{Duration, Instant};

use crate::barrier::SweepBarrier;
use crate::convergence::{ConvergenceTracker, SweepStatus};
use crate::error::{Result, SorError};
use crate::grid::RelaxGrid;
use crate::partition::{partition_rows, RowRange};
use crate::stencil::sweep_rows;

/// Progress information passed to the optional callback.
pub struct ProgressInfo {
    /// Number of sweeps completed so far.
    pub sweeps_completed: u64,
    /// Largest cell change of the most recent sweep.
    pub max_delta: f64,
    /// Elapsed time since the solve started.
    pub elapsed: Duration,
}

/// Result of a completed relaxation run.
pub struct RelaxReport {
    /// Number of sweeps it took to converge.
    pub sweeps: u64,
    /// Largest cell change of the final sweep.
    pub max_delta: f64,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// The relaxed field, with the final iterate on its active plane.
    pub grid: RelaxGrid,
}

/// A successive over-relaxation solver for the 2D Laplace problem.
///
/// The field is a square interior of `n x n` cells with a fixed potential
/// along its left boundary. Each sweep replaces every interior cell with
/// the mean of its four neighbors, reading from one plane and writing the
/// other; the run ends when the largest per-sweep change drops to the
/// threshold or below.
///
/// [`SorSolver::solve_parallel`] bands the rows across worker threads that
/// advance in lock step through a counting barrier; one designated worker
/// merges the per-band changes, publishes the stop decision, and flips the
/// planes between the two barrier crossings of each sweep. Because every
/// cell is computed from the same inputs in the same order as the
/// single-threaded loop, results are identical for every thread count.
pub struct SorSolver {
    interior: usize,
    threshold: f64,
    threads: usize,
    max_sweeps: Option<u64>,
    progress_callback: Option<Box<dyn Fn(ProgressInfo) + Send + Sync>>,
    progress_interval: Duration,
}

impl SorSolver {
    /// Create a solver for an `interior x interior` field.
    ///
    /// # Parameters
    /// - `interior`: Interior rows and columns (must be >= 1)
    /// - `threshold`: Stop level for the per-sweep maximum change (must be
    ///   positive and finite)
    /// - `threads`: Worker count for parallel runs (must be between 1 and
    ///   `interior`, so every worker owns at least one row)
    ///
    /// # Errors
    /// Returns an error if any parameter is out of range.
    pub fn new(interior: usize, threshold: f64, threads: usize) -> Result<Self> {
        if interior == 0 {
            return Err(SorError::InvalidGridSize(interior));
        }
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(SorError::InvalidThreshold(threshold));
        }
        if threads == 0 || threads > interior {
            return Err(SorError::InvalidThreadCount {
                threads,
                rows: interior,
            });
        }
        Ok(SorSolver {
            interior,
            threshold,
            threads,
            max_sweeps: None,
            progress_callback: None,
            progress_interval: Duration::from_millis(500),
        })
    }

    /// Abort the run with an error if it has not converged after
    /// `max_sweeps` sweeps (builder method). Off by default: an
    /// unconfigured solver sweeps until the field converges.
    pub fn with_max_sweeps(mut self, max_sweeps: u64) -> Self {
        self.max_sweeps = Some(max_sweeps);
        self
    }

    /// Set a progress callback invoked periodically during the run
    /// (builder method). In parallel runs the combining worker invokes it
    /// between sweeps.
    pub fn with_progress(mut self, callback: Box<dyn Fn(ProgressInfo) + Send + Sync>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Set the minimum time between progress callbacks (builder method).
    /// Default is 500ms.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Interior size the solver was built for.
    pub fn interior_size(&self) -> usize {
        self.interior
    }

    /// Convergence threshold the solver was built for.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Worker count used by parallel runs.
    pub fn threads(&self) -> usize {
        self.threads
    }

    fn maybe_report(&self, start: Instant, last_emit: &mut Instant, sweeps: u64, max_delta: f64) {
        if let Some(cb) = &self.progress_callback {
            if last_emit.elapsed() >= self.progress_interval {
                *last_emit = Instant::now();
                cb(ProgressInfo {
                    sweeps_completed: sweeps,
                    max_delta,
                    elapsed: start.elapsed(),
                });
            }
        }
    }

    /// Run the single-threaded reference loop on a fresh field.
    ///
    /// # Errors
    /// Returns an error if a configured sweep cap is reached before the
    /// field converges.
    pub fn solve_sequential(&self) -> Result<RelaxReport> {
        let grid = RelaxGrid::new(self.interior)?;
        let rows = RowRange::new(1, self.interior);
        let use_progress = self.progress_callback.is_some();
        let start = Instant::now();
        let mut last_emit = Instant::now();
        let mut sweeps: u64 = 0;

        loop {
            let max_delta = sweep_rows(&grid, rows);
            grid.swap();
            sweeps += 1;
            if use_progress {
                self.maybe_report(start, &mut last_emit, sweeps, max_delta);
            }
            if max_delta <= self.threshold {
                return Ok(RelaxReport {
                    sweeps,
                    max_delta,
                    elapsed: start.elapsed(),
                    grid,
                });
            }
            if let Some(limit) = self.max_sweeps {
                if sweeps >= limit {
                    return Err(SorError::SweepLimitExceeded { limit });
                }
            }
        }
    }

    /// Run the barrier-synchronized parallel loop on a fresh field.
    ///
    /// Spawns one worker per row band. Each sweep, every worker relaxes
    /// its band and records its largest change, then crosses the first
    /// barrier. The worker owning the last band merges the changes,
    /// publishes the stop decision, and flips the planes; the second
    /// barrier releases the team to act on that decision together, so all
    /// workers stop after the same sweep.
    ///
    /// # Errors
    /// Returns an error if a configured sweep cap is reached before the
    /// field converges.
    pub fn solve_parallel(&self) -> Result<RelaxReport> {
        let grid = RelaxGrid::new(self.interior)?;
        let ranges = partition_rows(1, self.interior, self.threads)?;
        let barrier = SweepBarrier::new(self.threads);
        let tracker = ConvergenceTracker::new(self.threads, self.threshold, self.max_sweeps);
        let combiner = ranges.len() - 1;
        let use_progress = self.progress_callback.is_some();
        let start = Instant::now();

        std::thread::scope(|scope| {
            for (worker, range) in ranges.iter().copied().enumerate() {
                let grid = &grid;
                let barrier = &barrier;
                let tracker = &tracker;
                scope.spawn(move || {
                    let mut last_emit = Instant::now();
                    loop {
                        let delta = sweep_rows(grid, range);
                        tracker.record_local(worker, delta);
                        barrier.arrive_and_wait();
                        if worker == combiner {
                            tracker.combine_and_swap(grid);
                            if use_progress {
                                self.maybe_report(
                                    start,
                                    &mut last_emit,
                                    tracker.sweeps(),
                                    tracker.max_delta(),
                                );
                            }
                        }
                        barrier.arrive_and_wait();
                        if tracker.status() != SweepStatus::Continue {
                            break;
                        }
                    }
                });
            }
        });

        match tracker.status() {
            SweepStatus::Converged => Ok(RelaxReport {
                sweeps: tracker.sweeps(),
                max_delta: tracker.max_delta(),
                elapsed: start.elapsed(),
                grid,
            }),
            SweepStatus::LimitReached { limit } => Err(SorError::SweepLimitExceeded { limit }),
            SweepStatus::Continue => Err(SorError::Other(
                "relaxation workers exited before a decision was published".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn rejects_zero_interior() {
        assert!(matches!(
            SorSolver::new(0, 0.01, 1),
            Err(SorError::InvalidGridSize(0))
        ));
    }

    #[test]
    fn rejects_bad_thresholds() {
        for bad in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    SorSolver::new(8, bad, 2),
                    Err(SorError::InvalidThreshold(_))
                ),
                "threshold {}",
                bad
            );
        }
    }

    #[test]
    fn rejects_bad_thread_counts() {
        assert!(matches!(
            SorSolver::new(8, 0.01, 0),
            Err(SorError::InvalidThreadCount { threads: 0, rows: 8 })
        ));
        assert!(matches!(
            SorSolver::new(8, 0.01, 9),
            Err(SorError::InvalidThreadCount { threads: 9, rows: 8 })
        ));
    }

    #[test]
    fn one_cell_field_converges_in_two_sweeps() {
        // Sweep 1 moves the cell from 0 to 1/4 (delta 1/4). Sweep 2
        // recomputes 1/4 from unchanged neighbors (delta 0).
        let report = SorSolver::new(1, 0.01, 1)
            .unwrap()
            .solve_sequential()
            .unwrap();
        assert_eq!(report.sweeps, 2);
        assert_eq!(report.max_delta, 0.0);
        assert_eq!(report.grid.value(1, 1), 0.25);
    }

    #[test]
    fn sequential_sweep_count_is_exact() {
        // n=2: sweep deltas are 1/4 then 1/16, so a threshold of 0.1
        // stops after the second sweep.
        let report = SorSolver::new(2, 0.1, 1)
            .unwrap()
            .solve_sequential()
            .unwrap();
        assert_eq!(report.sweeps, 2);
        assert_eq!(report.max_delta, 0.0625);
    }

    #[test]
    fn parallel_matches_sequential_exactly() {
        let sequential = SorSolver::new(6, 1e-4, 1)
            .unwrap()
            .solve_sequential()
            .unwrap();
        for threads in 1..=6 {
            let parallel = SorSolver::new(6, 1e-4, threads)
                .unwrap()
                .solve_parallel()
                .unwrap();
            assert_eq!(parallel.sweeps, sequential.sweeps, "threads={}", threads);
            assert_eq!(
                parallel.grid.max_abs_diff(&sequential.grid).unwrap(),
                0.0,
                "threads={}",
                threads
            );
        }
    }

    #[test]
    fn sweep_cap_aborts_both_paths() {
        let solver = SorSolver::new(8, 1e-12, 2).unwrap().with_max_sweeps(3);
        assert!(matches!(
            solver.solve_sequential(),
            Err(SorError::SweepLimitExceeded { limit: 3 })
        ));
        assert!(matches!(
            solver.solve_parallel(),
            Err(SorError::SweepLimitExceeded { limit: 3 })
        ));
    }

    #[test]
    fn progress_callback_fires() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let report = SorSolver::new(8, 1e-6, 2)
            .unwrap()
            .with_progress(Box::new(move |info| {
                assert!(info.sweeps_completed > 0);
                seen.fetch_add(1, Ordering::Relaxed);
            }))
            .with_progress_interval(Duration::ZERO)
            .solve_parallel()
            .unwrap();
        assert_eq!(calls.load(Ordering::Relaxed) as u64, report.sweeps);
    }

    #[test]
    fn builder_accessors() {
        let solver = SorSolver::new(16, 0.001, 4).unwrap();
        assert_eq!(solver.interior_size(), 16);
        assert_eq!(solver.threshold(), 0.001);
        assert_eq!(solver.threads(), 4);
    }
}
