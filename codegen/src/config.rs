//! Script configuration.
//!
//! Every option of a run with its default, loadable from TOML:
//!
//! ```toml
//! top = 60.0
//! bottom = 30.0
//! left = -10.0
//! right = 40.0
//! increment = 0.5
//! input = "land_polygons.the_geom"
//! output = "land_grid.geom"
//! aggregate = "union"
//! include-truncate = true
//! ```
//!
//! Unset keys fall back to the whole-globe, one-degree, `collect` defaults.

use gridpoly_grid::{Extent, DEFAULT_INCREMENT};
use serde::Deserialize;

use crate::aggregate::{Aggregation, Destination};
use crate::error::EmitError;
use crate::ident::TableColumn;
use crate::pipeline::{Pipeline, PipelineOptions};

/// Unparsed run options, as read from a file or the command line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ScriptConfig {
    /// Upper Y bound.
    pub top: f64,
    /// Lower Y bound.
    pub bottom: f64,
    /// Lower X bound.
    pub left: f64,
    /// Upper X bound.
    pub right: f64,
    /// Cell side length.
    pub increment: f64,
    /// Source `table.column`.
    pub input: Option<String>,
    /// Destination `table.column`.
    pub output: Option<String>,
    /// `collect` or `union`.
    pub aggregate: String,
    /// Truncate the destination first.
    pub include_truncate: bool,
    /// The destination is known to be empty.
    pub destination_empty: bool,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        let extent = Extent::default();
        Self {
            top: extent.top,
            bottom: extent.bottom,
            left: extent.left,
            right: extent.right,
            increment: DEFAULT_INCREMENT,
            input: None,
            output: None,
            aggregate: Aggregation::default().as_str().to_string(),
            include_truncate: false,
            destination_empty: false,
        }
    }
}

impl ScriptConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::Config`] on malformed TOML, unknown keys or
    /// mistyped values.
    pub fn from_toml(text: &str) -> Result<Self, EmitError> {
        Ok(toml::from_str(text)?)
    }

    /// The extent described by the four bounds.
    #[must_use]
    pub fn extent(&self) -> Extent {
        Extent {
            top: self.top,
            bottom: self.bottom,
            left: self.left,
            right: self.right,
        }
    }

    /// Parses every option and validates the run.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::InvalidTableColumnSpec`] if `input` or `output` is
    /// missing or malformed, [`EmitError::UnsupportedAggregation`] for an
    /// unknown mode, [`EmitError::ConflictingDestination`] if both destination
    /// flags are set, and the errors of [`Pipeline::for_extent`].
    pub fn pipeline(&self) -> Result<Pipeline, EmitError> {
        let options = PipelineOptions {
            input: required_table_column(self.input.as_deref())?,
            output: required_table_column(self.output.as_deref())?,
            aggregation: self.aggregate.parse()?,
            destination: Destination::from_flags(self.include_truncate, self.destination_empty)?,
        };
        Pipeline::for_extent(self.extent(), self.increment, options)
    }
}

fn required_table_column(spec: Option<&str>) -> Result<TableColumn, EmitError> {
    match spec {
        Some(spec) => spec.parse(),
        None => Err(EmitError::InvalidTableColumnSpec {
            spec: String::new(),
            reason: "missing; expected table.column",
        }),
    }
}
