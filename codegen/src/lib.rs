//! PostGIS script generator for gridded polygon tables.
//!
//! Produces one transaction that cuts every geometry of an input table along
//! a regular grid and writes one aggregated geometry per grid cell into an
//! output table. Nothing is executed here; the output is SQL text for `psql`.
//!
//! # Entry Point
//!
//! ```
//! use gridpoly_codegen::{render_script, ScriptConfig};
//!
//! let config = ScriptConfig {
//!     top: 2.0,
//!     bottom: 0.0,
//!     left: 0.0,
//!     right: 3.0,
//!     input: Some("land_polygons.the_geom".into()),
//!     output: Some("land_grid.geom".into()),
//!     include_truncate: true,
//!     ..ScriptConfig::default()
//! };
//! let sql = render_script(&config.pipeline()?);
//! assert!(sql.starts_with("BEGIN;\nTRUNCATE TABLE land_grid;\n"));
//! assert!(sql.ends_with("COMMIT;\n"));
//! # Ok::<(), gridpoly_codegen::EmitError>(())
//! ```
//!
//! # Statement Order
//!
//! 1. `BEGIN`, then `TRUNCATE` of the output table if requested
//! 2. Temporary `boxes` table with GIST and unique indexes, one insert per cell
//! 3. Temporary `ungrouped_output` table filled by the classify-and-clip join
//! 4. `boxes` dropped
//! 5. Per-cell aggregation into the output table (`collect` or `union`)
//! 6. `ungrouped_output` dropped, `COMMIT`

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod aggregate;
pub mod config;
pub mod emit;
pub mod error;
pub mod ident;
pub mod pipeline;
pub mod script;

pub use aggregate::{AggregatePlan, Aggregation, Destination};
pub use config::ScriptConfig;
pub use emit::{Phase, Statement};
pub use error::EmitError;
pub use ident::TableColumn;
pub use pipeline::{Pipeline, PipelineOptions};
pub use script::{render_script, write_script};
