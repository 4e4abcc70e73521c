//! Error types for vector operations

use thiserror::Error;

/// Caller errors raised by [`Vector`](crate::Vector) operations.
///
/// Numeric anomalies such as division by zero are not errors; they show up as
/// `NaN` or infinite values in the forward values and gradients.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Index outside `[0, len)`
    #[error("index {index} out of range for vector of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// Elementwise operation on vectors of different lengths
    #[error("size mismatch: left operand has {left} elements, right operand has {right}")]
    SizeMismatch { left: usize, right: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
