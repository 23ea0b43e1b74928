//! Per-cell aggregation of classified fragments.
//!
//! Fragments are grouped by the cell they were clipped to and folded into one
//! destination row per cell. Two strategies exist:
//!
//! - `collect` concatenates the fragments into a multi-polygon. Overlapping
//!   fragments stay overlapping.
//! - `union` dissolves them into non-overlapping polygons.
//!
//! The union has two execution paths with the same result per cell, picked
//! by [`Destination`]. See [`AggregatePlan`].

use std::fmt;
use std::str::FromStr;

use crate::emit::{Phase, Statement, FRAGMENT_TABLE};
use crate::error::EmitError;
use crate::ident::TableColumn;

/// How fragments of one cell are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Aggregation {
    /// Concatenate without dissolving overlaps.
    #[default]
    Collect,
    /// Geometric union.
    Union,
}

impl Aggregation {
    /// The command-line spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Aggregation::Collect => "collect",
            Aggregation::Union => "union",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregation {
    type Err = EmitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collect" => Ok(Aggregation::Collect),
            "union" => Ok(Aggregation::Union),
            other => Err(EmitError::UnsupportedAggregation(other.to_string())),
        }
    }
}

/// What the destination table holds when the script starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Destination {
    /// Emit a `TRUNCATE` right after `BEGIN`.
    Truncate,
    /// The caller guarantees the table is empty; no `TRUNCATE` is emitted.
    KnownEmpty,
    /// Existing rows stay. New rows are appended and stale ones are never
    /// cleared.
    #[default]
    Retain,
}

impl Destination {
    /// Maps the two command-line flags onto a destination state.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::ConflictingDestination`] if both are set.
    pub fn from_flags(truncate: bool, known_empty: bool) -> Result<Self, EmitError> {
        match (truncate, known_empty) {
            (true, true) => Err(EmitError::ConflictingDestination),
            (true, false) => Ok(Destination::Truncate),
            (false, true) => Ok(Destination::KnownEmpty),
            (false, false) => Ok(Destination::Retain),
        }
    }

    /// Returns true if the script clears the table itself.
    #[must_use]
    pub fn truncates(self) -> bool {
        self == Destination::Truncate
    }
}

/// Resolved aggregation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatePlan {
    /// One grouped `ST_Collect` insert.
    Collect,
    /// Grouped `ST_Collect` insert followed by an in-place `ST_UnaryUnion`
    /// over the whole destination.
    ///
    /// The `ST_Union` aggregate is much slower on large groups than unioning
    /// one already-collected geometry per row. The table-wide `UPDATE` is only
    /// correct because the table was truncated in the same transaction, so
    /// every row in it was written by this script.
    CollectThenUnaryUnion,
    /// One grouped `ST_Union` insert.
    ///
    /// Used when the destination cannot be touched wholesale. Into a table
    /// that already holds rows for the same cells this would insert
    /// duplicates, which is why [`AggregatePlan::resolve`] only picks it for
    /// a known-empty destination.
    UnionAggregate,
}

impl AggregatePlan {
    /// Picks the execution path for `aggregation` into `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::UnionIntoRetainedDestination`] for `union` into a
    /// destination that may already hold rows.
    pub fn resolve(
        aggregation: Aggregation,
        destination: Destination,
        output: &TableColumn,
    ) -> Result<Self, EmitError> {
        match (aggregation, destination) {
            (Aggregation::Collect, _) => Ok(AggregatePlan::Collect),
            (Aggregation::Union, Destination::Truncate) => Ok(AggregatePlan::CollectThenUnaryUnion),
            (Aggregation::Union, Destination::KnownEmpty) => Ok(AggregatePlan::UnionAggregate),
            (Aggregation::Union, Destination::Retain) => {
                Err(EmitError::UnionIntoRetainedDestination {
                    table: output.table.clone(),
                })
            }
        }
    }

    /// Statements writing one row per cell into `output`.
    #[must_use]
    pub fn statements(self, output: &TableColumn) -> Vec<Statement> {
        match self {
            AggregatePlan::Collect => vec![grouped_insert(output, "ST_Collect")],
            AggregatePlan::CollectThenUnaryUnion => vec![
                grouped_insert(output, "ST_Collect"),
                Statement::new(
                    Phase::Aggregate,
                    format!(
                        "UPDATE {table} SET {column} = ST_Multi(ST_UnaryUnion({column}));",
                        table = output.table,
                        column = output.column,
                    ),
                ),
            ],
            AggregatePlan::UnionAggregate => vec![grouped_insert(output, "ST_Union")],
        }
    }
}

/// `INSERT … SELECT` folding each cell's fragments with `aggregate_fn`,
/// keeping polygonal parts only. Null fragments are skipped by the
/// aggregate; a cell whose fragments are all null gets a null geometry.
fn grouped_insert(output: &TableColumn, aggregate_fn: &str) -> Statement {
    Statement::new(
        Phase::Aggregate,
        format!(
            "INSERT into {table} ({column}) SELECT ST_Multi(ST_CollectionExtract(\
             {aggregate_fn}({FRAGMENT_TABLE}.geom), 3)) as {column} \
             FROM {FRAGMENT_TABLE} GROUP BY boxid;",
            table = output.table,
            column = output.column,
        ),
    )
}
