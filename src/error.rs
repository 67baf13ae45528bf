// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

/// Errors that can occur during solver setup, I/O, or execution.
#[derive(Debug)]
pub enum SorError {
    /// Interior grid size is invalid (zero).
    InvalidGridSize(usize),
    /// Convergence threshold is not positive and finite.
    InvalidThreshold(f64),
    /// Worker count is invalid (zero or more workers than interior rows).
    InvalidThreadCount {
        /// The worker count requested.
        threads: usize,
        /// The number of interior rows available.
        rows: usize,
    },
    /// Sweep limit exceeded before the field converged.
    SweepLimitExceeded {
        /// The limit that was set.
        limit: u64,
    },
    /// Matrix shapes are not compatible for the requested operation.
    ShapeMismatch {
        /// Rows and columns of the left operand.
        left: (usize, usize),
        /// Rows and columns of the right operand.
        right: (usize, usize),
    },
    /// Matrix dimension is invalid (zero rows or columns).
    InvalidMatrixShape {
        /// The rows provided.
        rows: usize,
        /// The columns provided.
        cols: usize,
    },
    /// PPM stream is malformed or uses an unsupported variant.
    PpmFormat(String),
    /// Frame and background images have different dimensions.
    ImageSizeMismatch {
        /// Width and height of the frame.
        frame: (usize, usize),
        /// Width and height of the background.
        background: (usize, usize),
    },
    /// Pipeline configuration is invalid.
    InvalidPipelineConfig(String),
    /// Pixel value exceeds the declared maximum.
    PpmValueOutOfRange {
        /// The offending sample value.
        value: u32,
        /// The maximum declared in the header.
        max: u32,
    },
    /// Queue capacity is invalid (zero).
    InvalidQueueCapacity,
    /// Push was attempted on a queue that has been closed.
    QueueClosed,
    /// I/O error occurred.
    IoError(std::io::Error),
    /// Other error with a descriptive message.
    Other(String),
}

impl fmt::Display for SorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SorError::InvalidGridSize(n) => {
                write!(f, "invalid grid size: {} (must be >= 1)", n)
            }
            SorError::InvalidThreshold(t) => {
                write!(
                    f,
                    "invalid threshold: {} (must be positive and finite)",
                    t
                )
            }
            SorError::InvalidThreadCount { threads, rows } => {
                write!(
                    f,
                    "invalid thread count: {} (must be between 1 and {} interior rows)",
                    threads, rows
                )
            }
            SorError::SweepLimitExceeded { limit } => {
                write!(f, "sweep limit exceeded: limit was {}", limit)
            }
            SorError::ShapeMismatch { left, right } => {
                write!(
                    f,
                    "shape mismatch: cannot multiply {}x{} by {}x{}",
                    left.0, left.1, right.0, right.1
                )
            }
            SorError::InvalidMatrixShape { rows, cols } => {
                write!(f, "invalid matrix shape: {}x{}", rows, cols)
            }
            SorError::PpmFormat(msg) => {
                write!(f, "malformed PPM: {}", msg)
            }
            SorError::ImageSizeMismatch { frame, background } => {
                write!(
                    f,
                    "image size mismatch: frame is {}x{}, background is {}x{}",
                    frame.0, frame.1, background.0, background.1
                )
            }
            SorError::InvalidPipelineConfig(msg) => {
                write!(f, "invalid pipeline configuration: {}", msg)
            }
            SorError::PpmValueOutOfRange { value, max } => {
                write!(f, "PPM sample {} exceeds declared maximum {}", value, max)
            }
            SorError::InvalidQueueCapacity => {
                write!(f, "invalid queue capacity: 0 (must be >= 1)")
            }
            SorError::QueueClosed => {
                write!(f, "queue is closed")
            }
            SorError::IoError(e) => write!(f, "I/O error: {}", e),
            SorError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SorError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SorError {
    fn from(e: std::io::Error) -> Self {
        SorError::IoError(e)
    }
}

/// Convenience type alias for Results with SorError.
pub type Result<T> = std::result::Result<T, SorError>;
