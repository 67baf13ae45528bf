// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use ndarray::Array2;

use crate::error::{Result, SorError};
use crate::grid::RelaxGrid;

/// Save the field's active plane to a .npy file.
///
/// The array is written row-major with shape `(side, side)`, halo cells
/// included, so the boundary column is visible in the exported data.
pub fn save_npy(grid: &RelaxGrid, path: &Path) -> Result<()> {
    let side = grid.side();
    let arr = Array2::from_shape_vec((side, side), grid.snapshot())
        .map_err(|e| SorError::Other(format!("shape error: {}", e)))?;

    ndarray_npy::write_npy(path, &arr)
        .map_err(|e| SorError::Other(format!("npy write error: {}", e)))?;

    Ok(())
}
