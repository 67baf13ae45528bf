// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::ops::RangeInclusive;

use crate::error::{Result, SorError};

/// An inclusive, contiguous span of rows owned by a single worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    first: usize,
    last: usize,
}

impl RowRange {
    /// Create a span covering `first..=last`.
    pub fn new(first: usize, last: usize) -> Self {
        debug_assert!(first <= last, "empty row range: {}..={}", first, last);
        RowRange { first, last }
    }

    /// First row of the span.
    pub fn first(&self) -> usize {
        self.first
    }

    /// Last row of the span (inclusive).
    pub fn last(&self) -> usize {
        self.last
    }

    /// Number of rows in the span. Always at least 1.
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    /// Spans are never empty; present to pair with [`RowRange::len`].
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate the rows of the span in order.
    pub fn rows(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }
}

/// Split the rows `first..=last` into `parties` contiguous spans.
///
/// Every span except the final one holds exactly `span / parties` rows;
/// the final span additionally absorbs the whole remainder, so for 10 rows
/// and 3 parties the spans are 3, 3, and 4 rows. The spans are disjoint
/// and cover the input exactly, in order.
///
/// # Parameters
/// - `first`: First row to distribute
/// - `last`: Last row to distribute (inclusive, must be >= `first`)
/// - `parties`: Number of spans to produce (must be >= 1 and <= row count)
///
/// # Errors
/// Returns an error if `parties` is zero or exceeds the number of rows.
pub fn partition_rows(first: usize, last: usize, parties: usize) -> Result<Vec<RowRange>> {
    debug_assert!(first <= last, "empty row span: {}..={}", first, last);
    let span = last - first + 1;
    if parties == 0 || parties > span {
        return Err(SorError::InvalidThreadCount {
            threads: parties,
            rows: span,
        });
    }

    let block = span / parties;
    let mut ranges = Vec::with_capacity(parties);
    for party in 0..parties {
        let start = first + block * party;
        let end = if party == parties - 1 {
            last
        } else {
            start + block - 1
        };
        ranges.push(RowRange::new(start, end));
    }

    debug_assert_eq!(ranges[0].first(), first);
    debug_assert_eq!(ranges[parties - 1].last(), last);
    debug_assert!(ranges
        .windows(2)
        .all(|pair| pair[0].last() + 1 == pair[1].first()));

    Ok(ranges)
}
