// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::grid::RelaxGrid;
use crate::partition::RowRange;

/// Relax one band of rows: for every interior cell in `rows`, replace the
/// cell with the arithmetic mean of its four edge neighbors,
///
///   u'[i][j] = (u[i-1][j] + u[i][j+1] + u[i+1][j] + u[i][j-1]) / 4
///
/// reading every neighbor from the grid's active plane and writing the
/// result to the inactive plane. Returns the band's largest
/// `|u'[i][j] - u[i][j]|`.
///
/// Both the single-threaded reference loop and the worker threads run this
/// same function, so a full pass over `1..=n` produces bit-identical cells
/// regardless of how the rows are banded.
///
/// `rows` must lie within the interior, `1..=interior_size`.
pub fn sweep_rows(grid: &RelaxGrid, rows: RowRange) -> f64 {
    debug_assert!(rows.first() >= 1 && rows.last() <= grid.interior_size());
    let cols = grid.interior_size();
    let mut max_delta = 0.0_f64;
    for row in rows.rows() {
        for col in 1..=cols {
            let average = (grid.value(row - 1, col)
                + grid.value(row, col + 1)
                + grid.value(row + 1, col)
                + grid.value(row, col - 1))
                / 4.0;
            let delta = (average - grid.value(row, col)).abs();
            if delta > max_delta {
                max_delta = delta;
            }
            grid.set_next(row, col, average);
        }
    }
    max_delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::BOUNDARY_VALUE;

    #[test]
    fn single_cell_first_pass() {
        // n=1: the lone interior cell sees 0 above, 0 right, 0 below and
        // the boundary 1 on its left, so u' = 1/4 and delta = 1/4.
        let grid = RelaxGrid::new(1).unwrap();
        let delta = sweep_rows(&grid, RowRange::new(1, 1));
        assert_eq!(delta, 0.25);
        assert_eq!(grid.value(1, 1), 0.0);
        grid.swap();
        assert_eq!(grid.value(1, 1), 0.25);
    }

    #[test]
    fn two_by_two_first_pass() {
        // Column 1 cells average in the boundary (u' = 1/4); column 2
        // cells see only zeros on the first pass.
        let grid = RelaxGrid::new(2).unwrap();
        let delta = sweep_rows(&grid, RowRange::new(1, 2));
        assert_eq!(delta, 0.25);
        grid.swap();
        assert_eq!(grid.value(1, 1), 0.25);
        assert_eq!(grid.value(2, 1), 0.25);
        assert_eq!(grid.value(1, 2), 0.0);
        assert_eq!(grid.value(2, 2), 0.0);
    }

    #[test]
    fn second_pass_uses_first_pass_values() {
        let grid = RelaxGrid::new(2).unwrap();
        sweep_rows(&grid, RowRange::new(1, 2));
        grid.swap();

        // (1,1) now sees 0 above, 0.0 right, 0.25 below, 1 left:
        // u' = 1.25/4 = 0.3125, delta = 0.0625.
        // (1,2) sees 0.25 on its left: u' = 0.0625.
        let delta = sweep_rows(&grid, RowRange::new(1, 2));
        assert_eq!(delta, 0.0625);
        grid.swap();
        assert_eq!(grid.value(1, 1), 0.3125);
        assert_eq!(grid.value(1, 2), 0.0625);
    }

    #[test]
    fn band_only_writes_its_own_rows() {
        let grid = RelaxGrid::new(3).unwrap();
        sweep_rows(&grid, RowRange::new(1, 1));
        grid.swap();
        assert_eq!(grid.value(1, 1), 0.25);
        // Rows 2 and 3 were not swept and keep their initial zeros.
        for col in 1..=3 {
            assert_eq!(grid.value(2, col), 0.0);
            assert_eq!(grid.value(3, col), 0.0);
        }
    }

    #[test]
    fn banding_matches_a_full_pass() {
        let full = RelaxGrid::new(5).unwrap();
        let banded = RelaxGrid::new(5).unwrap();

        for _ in 0..4 {
            let whole = sweep_rows(&full, RowRange::new(1, 5));
            full.swap();

            let lo = sweep_rows(&banded, RowRange::new(1, 2));
            let hi = sweep_rows(&banded, RowRange::new(3, 5));
            banded.swap();

            assert_eq!(whole, lo.max(hi));
        }
        assert_eq!(full.max_abs_diff(&banded).unwrap(), 0.0);
    }

    #[test]
    fn boundary_cells_are_never_touched() {
        let grid = RelaxGrid::new(3).unwrap();
        for _ in 0..10 {
            sweep_rows(&grid, RowRange::new(1, 3));
            grid.swap();
        }
        for row in 0..grid.side() {
            assert_eq!(grid.value(row, 0), BOUNDARY_VALUE);
            assert_eq!(grid.value(row, grid.side() - 1), 0.0);
        }
        for col in 1..grid.side() {
            assert_eq!(grid.value(0, col), 0.0);
            assert_eq!(grid.value(grid.side() - 1, col), 0.0);
        }
    }
}
