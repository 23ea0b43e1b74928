//! Grid model types.
//!
//! An [`Extent`] is the rectangle to be gridded and a [`Cell`] is one tile of
//! it. Both are plain coordinate records; validation happens when cells are
//! requested through [`generate_cells`](crate::generate_cells).

use crate::error::GridError;

/// Default step size, in degrees.
pub const DEFAULT_INCREMENT: f64 = 1.0;

/// The rectangular region to be gridded.
///
/// Coordinates are in the units of the target reference system (degrees for
/// EPSG:4326). The default is the whole globe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    /// Upper Y bound.
    pub top: f64,
    /// Lower Y bound.
    pub bottom: f64,
    /// Lower X bound.
    pub left: f64,
    /// Upper X bound.
    pub right: f64,
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            top: 90.0,
            bottom: -90.0,
            left: -180.0,
            right: 180.0,
        }
    }
}

impl Extent {
    /// Checks `bottom <= top`, `left <= right` and that all four coordinates
    /// are finite.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidExtent`] naming the violated invariant.
    pub fn validate(&self) -> Result<(), GridError> {
        let reason = if !self.corners_finite() {
            Some("coordinates must be finite")
        } else if self.bottom > self.top {
            Some("bottom is above top")
        } else if self.left > self.right {
            Some("left is right of right")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(GridError::InvalidExtent {
                top: self.top,
                bottom: self.bottom,
                left: self.left,
                right: self.right,
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Width along X.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Height along Y.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Largest absolute coordinate value on either axis.
    pub(crate) fn magnitude(&self) -> f64 {
        self.top
            .abs()
            .max(self.bottom.abs())
            .max(self.left.abs())
            .max(self.right.abs())
    }

    fn corners_finite(&self) -> bool {
        self.top.is_finite()
            && self.bottom.is_finite()
            && self.left.is_finite()
            && self.right.is_finite()
    }
}

/// One axis-aligned tile of the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Left edge.
    pub x_min: f64,
    /// Bottom edge.
    pub y_min: f64,
    /// Right edge.
    pub x_max: f64,
    /// Top edge.
    pub y_max: f64,
}

impl Cell {
    /// `x_max - x_min`.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// `y_max - y_min`.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Planar area of the tile.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Returns true if the tile lies inside `extent`, edges included.
    #[must_use]
    pub fn within(&self, extent: &Extent) -> bool {
        self.x_min >= extent.left
            && self.x_max <= extent.right
            && self.y_min >= extent.bottom
            && self.y_max <= extent.top
    }

    /// Returns true if the interiors of the two tiles share any area.
    #[must_use]
    pub fn overlaps(&self, other: &Cell) -> bool {
        self.x_min < other.x_max
            && other.x_min < self.x_max
            && self.y_min < other.y_max
            && other.y_min < self.y_max
    }
}
