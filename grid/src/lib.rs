//! Regular grid generation over a rectangular extent.
//!
//! Splits an [`Extent`] into square [`Cell`]s of side `increment`, walking
//! columns left to right and rows bottom to top. Trailing partial columns
//! and rows are dropped, never clamped.
//!
//! # Entry Point
//!
//! ```
//! use gridpoly_grid::{generate_cells, Extent};
//!
//! let extent = Extent { top: 2.0, bottom: 0.0, left: 0.0, right: 3.0 };
//! let cells: Vec<_> = generate_cells(extent, 1.0)?.collect();
//! assert_eq!(cells.len(), 6);
//! # Ok::<(), gridpoly_grid::GridError>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod cells;
pub mod error;
pub mod model;

pub use cells::{generate_cells, Cells};
pub use error::GridError;
pub use model::{Cell, Extent, DEFAULT_INCREMENT};
