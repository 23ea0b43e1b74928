//! Errors raised while assembling a script. Every one of them is raised before
//! the first statement is produced.

use gridpoly_grid::GridError;
use thiserror::Error;

/// A rejected script request.
#[derive(Debug, Error)]
pub enum EmitError {
    /// Extent or increment failed validation.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// An `input` / `output` argument is not of the form `table.column`.
    #[error("invalid table/column spec {spec:?}: {reason}")]
    InvalidTableColumnSpec {
        /// The argument as supplied.
        spec: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The aggregation mode is neither `collect` nor `union`.
    #[error("unsupported aggregation {0:?}: expected \"collect\" or \"union\"")]
    UnsupportedAggregation(String),

    /// `union` was requested into a destination that may already hold rows.
    ///
    /// The single-step union path inserts one row per cell without looking at
    /// what is already there, so a second run would duplicate cells.
    #[error(
        "union aggregation into {table:?} requires either truncating the table \
         or declaring it empty; existing rows would be duplicated"
    )]
    UnionIntoRetainedDestination {
        /// Destination table name.
        table: String,
    },

    /// Truncate and known-empty were both requested.
    #[error("truncate and known-empty destination are mutually exclusive")]
    ConflictingDestination,

    /// A configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}
