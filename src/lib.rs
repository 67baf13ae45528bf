// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! A barrier-synchronized parallel solver for the 2D Laplace problem.
//!
//! This library relaxes a square potential field by successive sweeps of
//! the four-neighbor mean, double-buffering the field so each sweep reads
//! a consistent previous iterate. Worker threads advance in lock step
//! through a hand-built counting barrier and stop together once the
//! largest per-sweep change falls to a caller-supplied threshold, with
//! results identical to the single-threaded reference loop for any worker
//! count.
//!
//! Two smaller parallel exercises ship alongside the relaxation engine: a
//! row-partitioned matrix multiply and a producer/consumer green-screen
//! compositor over a bounded queue.

#![warn(missing_docs)]

/// The reusable counting barrier workers synchronize on.
pub mod barrier;
/// Green-screen compositing and the frame pipeline.
pub mod chroma;
/// Per-sweep convergence tracking and the shared stop decision.
pub mod convergence;
/// Error types for the library.
pub mod error;
/// The double-buffered relaxation field.
pub mod grid;
/// Field export to .npy files.
pub mod io;
/// Row-partitioned matrix multiplication.
pub mod matmul;
/// Row decomposition across workers.
pub mod partition;
/// Plain-text PPM image reading and writing.
pub mod ppm;
/// The blocking bounded queue used by the frame pipeline.
pub mod queue;
/// The relaxation solver: sequential reference and parallel engine.
pub mod solver;
/// The four-neighbor relaxation kernel.
pub mod stencil;

pub use crate::barrier::SweepBarrier;
pub use crate::error::{Result, SorError};
pub use crate::grid::{RelaxGrid, BOUNDARY_VALUE};
pub use crate::partition::{partition_rows, RowRange};
pub use crate::solver::{ProgressInfo, RelaxReport, SorSolver};
