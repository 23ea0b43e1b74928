//! Precondition failures raised before any cell is produced.

use thiserror::Error;

/// Rejected grid input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// The extent is inverted or has a non-finite coordinate.
    #[error("invalid extent (top={top}, bottom={bottom}, left={left}, right={right}): {reason}")]
    InvalidExtent {
        /// Upper Y bound as supplied.
        top: f64,
        /// Lower Y bound as supplied.
        bottom: f64,
        /// Lower X bound as supplied.
        left: f64,
        /// Upper X bound as supplied.
        right: f64,
        /// Which invariant was violated.
        reason: &'static str,
    },
    /// The step size is not a finite positive number, or is too small to move
    /// the coordinates of the extent it is applied to.
    #[error("invalid increment {value}: {reason}")]
    InvalidIncrement {
        /// The step size as supplied.
        value: f64,
        /// Which invariant was violated.
        reason: &'static str,
    },
}
