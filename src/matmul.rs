// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt::Write as _;

use rand::Rng;

use crate::error::{Result, SorError};
use crate::partition::partition_rows;

/// Tolerance used when checking two result matrices for agreement.
pub const MATCH_TOLERANCE: f64 = 0.000001;

/// A dense row-major matrix of `f64` values.
#[derive(Debug, Clone)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a zero-filled matrix.
    ///
    /// # Errors
    /// Returns an error if either dimension is zero.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(SorError::InvalidMatrixShape { rows, cols });
        }
        Ok(Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        })
    }

    /// Create a matrix from a row-major value buffer.
    ///
    /// # Errors
    /// Returns an error if either dimension is zero or the buffer length
    /// does not equal `rows * cols`.
    pub fn from_data(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if rows == 0 || cols == 0 || data.len() != rows * cols {
            return Err(SorError::InvalidMatrixShape { rows, cols });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Create a matrix of uniform random values drawn from `[min, max]`.
    ///
    /// # Errors
    /// Returns an error if either dimension is zero.
    pub fn random(rows: usize, cols: usize, min: f64, max: f64) -> Result<Self> {
        let mut matrix = Matrix::new(rows, cols)?;
        let mut rng = rand::thread_rng();
        for cell in &mut matrix.data {
            *cell = rng.gen_range(min..=max);
        }
        Ok(matrix)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Value at `(row, col)`.
    pub fn at(&self, row: usize, col: usize) -> f64 {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col]
    }

    /// Store `value` at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col] = value;
    }

    fn transposed(&self) -> Matrix {
        let mut out = Matrix {
            rows: self.cols,
            cols: self.rows,
            data: vec![0.0; self.data.len()],
        };
        for row in 0..self.rows {
            for col in 0..self.cols {
                out.data[col * out.cols + row] = self.data[row * self.cols + col];
            }
        }
        out
    }

    fn product_row(&self, transposed: &Matrix, row: usize, out: &mut [f64]) {
        for col in 0..transposed.rows {
            let mut sum = 0.0;
            for k in 0..self.cols {
                sum += self.data[row * self.cols + k] * transposed.data[col * transposed.cols + k];
            }
            out[col] = sum;
        }
    }

    /// Multiply by `other` on a single thread.
    ///
    /// The right-hand matrix is transposed up front so both factors are
    /// walked along contiguous rows in the inner product.
    ///
    /// # Errors
    /// Returns an error if the inner dimensions disagree.
    pub fn multiply_sequential(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(SorError::ShapeMismatch {
                left: (self.rows, self.cols),
                right: (other.rows, other.cols),
            });
        }
        let transposed = other.transposed();
        let mut data = vec![0.0; self.rows * other.cols];
        for row in 0..self.rows {
            let band = &mut data[row * other.cols..(row + 1) * other.cols];
            self.product_row(&transposed, row, band);
        }
        Matrix::from_data(self.rows, other.cols, data)
    }

    /// Multiply by `other` with the output rows banded across `threads`
    /// worker threads.
    ///
    /// Each worker computes a contiguous band of result rows with the same
    /// inner product as [`Matrix::multiply_sequential`], so the two paths
    /// produce identical values.
    ///
    /// # Errors
    /// Returns an error if the inner dimensions disagree, `threads` is
    /// zero, or `threads` exceeds the number of result rows.
    pub fn multiply_parallel(&self, other: &Matrix, threads: usize) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(SorError::ShapeMismatch {
                left: (self.rows, self.cols),
                right: (other.rows, other.cols),
            });
        }
        let ranges = partition_rows(0, self.rows - 1, threads)?;
        let transposed = other.transposed();
        let mut data = vec![0.0; self.rows * other.cols];

        std::thread::scope(|scope| {
            let mut rest: &mut [f64] = &mut data;
            for range in &ranges {
                let (band, tail) = rest.split_at_mut(range.len() * other.cols);
                rest = tail;
                let transposed = &transposed;
                scope.spawn(move || {
                    let cols = transposed.rows;
                    for (offset, row) in range.rows().enumerate() {
                        let out = &mut band[offset * cols..(offset + 1) * cols];
                        self.product_row(transposed, row, out);
                    }
                });
            }
        });

        Matrix::from_data(self.rows, other.cols, data)
    }

    /// Whether every entry of `other` is within `tolerance` of this matrix.
    /// Matrices of different shapes never compare equal.
    pub fn approx_eq(&self, other: &Matrix, tolerance: f64) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }

    /// Render the matrix with fixed-width `{:10.5}` cells, one row per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let _ = write!(out, "{:10.5} ", self.at(row, col));
            }
            out.push('\n');
        }
        out
    }
}
