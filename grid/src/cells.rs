//! Cell generation.
//!
//! Columns advance left to right and rows bottom to top, both by repeated
//! addition of the increment. A column or row whose far edge would pass the
//! extent's right or top bound is dropped rather than clamped, so when the
//! extent is not an exact multiple of the increment a strip narrower than one
//! increment stays uncovered along the right and top edges.
//!
//! Coordinates are never rescaled from an index. The drift of repeated
//! addition is part of the output: a cell's `x_max` is bit-identical to the
//! `x_min` of the next column, and downstream statements depend on that.

use std::iter::FusedIterator;

use crate::error::GridError;
use crate::model::{Cell, Extent};

/// Returns the cells tiling `extent` in steps of `increment`.
///
/// Cells come out column by column (increasing X), and within a column row
/// by row (increasing Y). Consumers number cells in this order.
///
/// # Errors
///
/// Returns [`GridError::InvalidExtent`] if the extent is inverted or not
/// finite, and [`GridError::InvalidIncrement`] if the increment is not a
/// finite positive number or is too small to change the extent's
/// coordinates when added to them.
pub fn generate_cells(extent: Extent, increment: f64) -> Result<Cells, GridError> {
    extent.validate()?;
    validate_increment(&extent, increment)?;
    Ok(Cells::new(extent, increment))
}

fn validate_increment(extent: &Extent, increment: f64) -> Result<(), GridError> {
    let reason = if !increment.is_finite() {
        "must be finite"
    } else if increment <= 0.0 {
        "must be greater than zero"
    } else if increment < ulp(extent.magnitude()) {
        // Otherwise x + increment can round back to x and never terminate.
        "too small to advance the extent's coordinates"
    } else {
        return Ok(());
    };
    Err(GridError::InvalidIncrement {
        value: increment,
        reason,
    })
}

/// Gap between `m` and the next larger `f64`. No coordinate with `|x| <= m`
/// has a larger gap, so an increment of at least this size always advances.
fn ulp(m: f64) -> f64 {
    f64::from_bits(m.abs().to_bits() + 1) - m.abs()
}

/// Lazy, restartable sequence of grid cells.
///
/// Produced by [`generate_cells`]. Cloning yields an independent iterator
/// positioned at the same cell.
#[derive(Debug, Clone)]
pub struct Cells {
    extent: Extent,
    increment: f64,
    x: f64,
    y: f64,
    finished: bool,
}

impl Cells {
    fn new(extent: Extent, increment: f64) -> Self {
        Self {
            extent,
            increment,
            x: extent.left,
            y: extent.bottom,
            finished: false,
        }
    }

    /// The extent being gridded.
    #[must_use]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// The step size.
    #[must_use]
    pub fn increment(&self) -> f64 {
        self.increment
    }

    /// Cell count under exact arithmetic:
    /// `floor(width / increment) * floor(height / increment)`.
    ///
    /// The generated sequence can differ from this by a row or column when
    /// accumulated drift lands an edge just past a bound.
    #[must_use]
    pub fn ideal_count(&self) -> u64 {
        let columns = (self.extent.width() / self.increment).floor() as u64;
        let rows = (self.extent.height() / self.increment).floor() as u64;
        columns.saturating_mul(rows)
    }
}

impl Iterator for Cells {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        let Extent {
            top, bottom, right, ..
        } = self.extent;

        while !self.finished {
            if self.x >= right {
                self.finished = true;
                break;
            }
            let next_x = self.x + self.increment;
            if next_x > right || next_x <= self.x {
                // Trailing partial column.
                self.finished = true;
                break;
            }

            if self.y < top {
                let next_y = self.y + self.increment;
                if next_y <= self.y {
                    self.finished = true;
                    break;
                }
                if next_y <= top {
                    let cell = Cell {
                        x_min: self.x,
                        y_min: self.y,
                        x_max: next_x,
                        y_max: next_y,
                    };
                    self.y = next_y;
                    return Some(cell);
                }
            }

            // Column exhausted, or its next row would pass the top.
            self.x = next_x;
            self.y = bottom;
        }
        None
    }
}

impl FusedIterator for Cells {}
