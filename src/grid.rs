// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::error::{Result, SorError};

/// Fixed potential applied along the left edge of the field.
pub const BOUNDARY_VALUE: f64 = 1.0;

/// A square relaxation field with a one-cell halo and two storage planes.
///
/// The field holds `(n + 2) x (n + 2)` cells for an interior of `n x n`.
/// Row 0, row `n + 1`, column 0, and column `n + 1` form the halo; after
/// [`RelaxGrid::initialize`] the halo never changes. Two same-shaped planes
/// back the field: sweeps read every neighbor from the active plane and
/// write results to the inactive one, so a sweep always sees a consistent
/// previous iterate. [`RelaxGrid::swap`] flips which plane is active in
/// O(1) without copying cells.
///
/// Cells are stored as `f64` bit patterns in `AtomicU64` so worker threads
/// can share the field without locking. All cell and plane-index accesses
/// use `Ordering::Relaxed`; cross-thread visibility between sweeps is the
/// job of the sweep barrier, not of these atomics.
pub struct RelaxGrid {
    interior: usize,
    side: usize,
    planes: [Box<[AtomicU64]>; 2],
    active: AtomicUsize,
}

impl RelaxGrid {
    /// Create a new field with an `n x n` interior, zeroed and with the
    /// boundary column applied (see [`RelaxGrid::initialize`]).
    ///
    /// # Parameters
    /// - `interior`: Number of interior rows and columns (must be >= 1)
    ///
    /// # Errors
    /// Returns an error if `interior` is zero.
    pub fn new(interior: usize) -> Result<Self> {
        if interior == 0 {
            return Err(SorError::InvalidGridSize(interior));
        }
        let side = interior + 2;
        let num_cells = side * side;

        let planes = [
            Self::alloc_plane(num_cells),
            Self::alloc_plane(num_cells),
        ];

        let grid = RelaxGrid {
            interior,
            side,
            planes,
            active: AtomicUsize::new(0),
        };
        grid.initialize();
        Ok(grid)
    }

    fn alloc_plane(num_cells: usize) -> Box<[AtomicU64]> {
        (0..num_cells)
            .map(|_| AtomicU64::new(0.0_f64.to_bits()))
            .collect::<Vec<_>>()
            .into_boxed_slice()
    }

    /// Reset both planes to the starting state: every cell `0.0` except
    /// column 0, which holds [`BOUNDARY_VALUE`] in every row including the
    /// halo rows. Calling this again (in any order with other calls to it)
    /// reproduces the identical state.
    pub fn initialize(&self) {
        for plane in &self.planes {
            for row in 0..self.side {
                for col in 0..self.side {
                    let value = if col == 0 { BOUNDARY_VALUE } else { 0.0 };
                    plane[row * self.side + col].store(value.to_bits(), Ordering::Relaxed);
                }
            }
        }
    }

    /// Number of interior rows (and columns).
    pub fn interior_size(&self) -> usize {
        self.interior
    }

    /// Full side length including the halo, `interior + 2`.
    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.side && col < self.side);
        row * self.side + col
    }

    #[inline]
    fn active_plane(&self) -> &[AtomicU64] {
        &self.planes[self.active.load(Ordering::Relaxed)]
    }

    #[inline]
    fn inactive_plane(&self) -> &[AtomicU64] {
        &self.planes[1 - self.active.load(Ordering::Relaxed)]
    }

    /// Read a cell from the active plane.
    #[inline]
    pub fn value(&self, row: usize, col: usize) -> f64 {
        f64::from_bits(self.active_plane()[self.index(row, col)].load(Ordering::Relaxed))
    }

    /// Write an interior cell of the inactive plane. The halo is owned by
    /// [`RelaxGrid::initialize`] and must never be written here.
    #[inline]
    pub fn set_next(&self, row: usize, col: usize, value: f64) {
        debug_assert!(
            (1..=self.interior).contains(&row) && (1..=self.interior).contains(&col),
            "writes are restricted to interior cells: ({}, {})",
            row,
            col
        );
        self.inactive_plane()[self.index(row, col)].store(value.to_bits(), Ordering::Relaxed);
    }

    /// Flip which plane is active. O(1): only the plane index moves, no
    /// cells are copied.
    ///
    /// Exactly one thread may call this per sweep, strictly between the
    /// point where all workers have finished writing (first barrier) and
    /// the point where they resume reading (second barrier). The sweep
    /// barrier provides the ordering that makes the flip visible.
    pub fn swap(&self) {
        self.active.fetch_xor(1, Ordering::Relaxed);
    }

    /// Largest absolute cell difference between the active planes of two
    /// same-sized fields, halo included.
    ///
    /// # Errors
    /// Returns an error if the fields have different interior sizes.
    pub fn max_abs_diff(&self, other: &RelaxGrid) -> Result<f64> {
        if self.interior != other.interior {
            return Err(SorError::ShapeMismatch {
                left: (self.side, self.side),
                right: (other.side, other.side),
            });
        }
        let mut max = 0.0_f64;
        for row in 0..self.side {
            for col in 0..self.side {
                let diff = (self.value(row, col) - other.value(row, col)).abs();
                if diff > max {
                    max = diff;
                }
            }
        }
        Ok(max)
    }

    /// Whether every cell of the two active planes agrees within
    /// `tolerance`.
    ///
    /// # Errors
    /// Returns an error if the fields have different interior sizes.
    pub fn approx_eq(&self, other: &RelaxGrid, tolerance: f64) -> Result<bool> {
        Ok(self.max_abs_diff(other)? <= tolerance)
    }

    /// Copy the active plane into a row-major `Vec<f64>` of length
    /// `side * side`. Used for export and inspection.
    pub fn snapshot(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.side * self.side);
        for row in 0..self.side {
            for col in 0..self.side {
                out.push(self.value(row, col));
            }
        }
        out
    }

    /// Render the active plane as fixed-width text, one field row per
    /// line. Intended for small fields on a terminal.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in 0..self.side {
            for col in 0..self.side {
                let _ = write!(out, "{:10.6} ", self.value(row, col));
            }
            out.push('\n');
        }
        out
    }
}

// SAFETY: RelaxGrid can be safely sent between threads. All fields are Send:
// - `planes: [Box<[AtomicU64]>; 2]` — AtomicU64 is Send
// - `active: AtomicUsize` — AtomicUsize is Send
// - remaining fields are plain usize
unsafe impl Send for RelaxGrid {}

// SAFETY: RelaxGrid can be safely shared between threads:
// - `planes` cells are accessed only through AtomicU64 load/store
// - `active` is accessed only through AtomicUsize operations; the single
//   writer per sweep and the barrier ordering are upheld by the solver
// - `interior` and `side` are never mutated after construction
unsafe impl Sync for RelaxGrid {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_interior() {
        assert!(matches!(
            RelaxGrid::new(0),
            Err(SorError::InvalidGridSize(0))
        ));
    }

    #[test]
    fn initial_state_boundary_column() {
        let grid = RelaxGrid::new(4).unwrap();
        for row in 0..grid.side() {
            assert_eq!(grid.value(row, 0), BOUNDARY_VALUE, "row {}", row);
            for col in 1..grid.side() {
                assert_eq!(grid.value(row, col), 0.0, "({}, {})", row, col);
            }
        }
    }

    #[test]
    fn both_planes_carry_the_boundary() {
        let grid = RelaxGrid::new(3).unwrap();
        grid.swap();
        for row in 0..grid.side() {
            assert_eq!(grid.value(row, 0), BOUNDARY_VALUE);
            assert_eq!(grid.value(row, grid.side() - 1), 0.0);
        }
    }

    #[test]
    fn initialize_is_idempotent() {
        let grid = RelaxGrid::new(5).unwrap();
        let first = grid.snapshot();
        grid.initialize();
        grid.initialize();
        let second = grid.snapshot();
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn initialize_clears_sweep_results() {
        let grid = RelaxGrid::new(3).unwrap();
        grid.set_next(2, 2, 0.75);
        grid.swap();
        assert_eq!(grid.value(2, 2), 0.75);
        grid.initialize();
        assert_eq!(grid.value(2, 2), 0.0);
        grid.swap();
        assert_eq!(grid.value(2, 2), 0.0);
    }

    #[test]
    fn set_next_is_invisible_until_swap() {
        let grid = RelaxGrid::new(4).unwrap();
        grid.set_next(2, 3, 0.5);
        assert_eq!(grid.value(2, 3), 0.0);
        grid.swap();
        assert_eq!(grid.value(2, 3), 0.5);
    }

    #[test]
    fn swap_alternates_planes() {
        let grid = RelaxGrid::new(2).unwrap();
        grid.set_next(1, 1, 0.25);
        grid.swap();
        assert_eq!(grid.value(1, 1), 0.25);
        grid.swap();
        assert_eq!(grid.value(1, 1), 0.0);
        grid.swap();
        assert_eq!(grid.value(1, 1), 0.25);
    }

    #[test]
    fn max_abs_diff_and_approx_eq() {
        let a = RelaxGrid::new(3).unwrap();
        let b = RelaxGrid::new(3).unwrap();
        assert_eq!(a.max_abs_diff(&b).unwrap(), 0.0);
        assert!(a.approx_eq(&b, 0.0).unwrap());

        b.set_next(2, 2, 0.125);
        b.swap();
        assert_eq!(a.max_abs_diff(&b).unwrap(), 0.125);
        assert!(a.approx_eq(&b, 0.2).unwrap());
        assert!(!a.approx_eq(&b, 0.1).unwrap());
    }

    #[test]
    fn max_abs_diff_rejects_size_mismatch() {
        let a = RelaxGrid::new(3).unwrap();
        let b = RelaxGrid::new(4).unwrap();
        assert!(matches!(
            a.max_abs_diff(&b),
            Err(SorError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn snapshot_is_row_major() {
        let grid = RelaxGrid::new(2).unwrap();
        grid.set_next(1, 2, 0.5);
        grid.swap();
        let snap = grid.snapshot();
        assert_eq!(snap.len(), 16);
        assert_eq!(snap[4 + 2], 0.5);
        assert_eq!(snap[2 * 4], BOUNDARY_VALUE);
    }

    #[test]
    fn render_has_one_line_per_row() {
        let grid = RelaxGrid::new(2).unwrap();
        let text = grid.render();
        assert_eq!(text.lines().count(), grid.side());
    }
}
