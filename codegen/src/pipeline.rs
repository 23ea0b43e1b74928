//! Ordered statement stream for one gridding run.
//!
//! A [`Pipeline`] is validated once, on construction. After that
//! [`Pipeline::statements`] cannot fail, so a script is either produced whole
//! or not started at all.

use std::iter;

use gridpoly_grid::{generate_cells, Cells, Extent};
use tracing::{debug, info, warn};

use crate::aggregate::{AggregatePlan, Aggregation, Destination};
use crate::emit::{self, Statement};
use crate::error::EmitError;
use crate::ident::TableColumn;

/// Options for one run, already parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Source geometries.
    pub input: TableColumn,
    /// Destination for the per-cell geometries.
    pub output: TableColumn,
    /// Fragment aggregation mode.
    pub aggregation: Aggregation,
    /// State of the destination table.
    pub destination: Destination,
}

/// A validated gridding run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    cells: Cells,
    options: PipelineOptions,
    plan: AggregatePlan,
}

impl Pipeline {
    /// Validates `options` against an already generated cell sequence.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::UnionIntoRetainedDestination`] if `union` is
    /// requested into a destination that may hold rows.
    pub fn new(cells: Cells, options: PipelineOptions) -> Result<Self, EmitError> {
        let plan = AggregatePlan::resolve(options.aggregation, options.destination, &options.output)?;

        debug!(
            input = %options.input,
            output = %options.output,
            aggregation = %options.aggregation,
            destination = ?options.destination,
            plan = ?plan,
            "pipeline configured"
        );
        if options.destination == Destination::Retain {
            warn!(
                table = %options.output.table,
                "destination is not truncated; rows from earlier runs are kept"
            );
        }

        Ok(Self {
            cells,
            options,
            plan,
        })
    }

    /// Generates the cells for `extent` and validates the whole run.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::Grid`] for an invalid extent or increment, and
    /// the errors of [`Pipeline::new`].
    pub fn for_extent(
        extent: Extent,
        increment: f64,
        options: PipelineOptions,
    ) -> Result<Self, EmitError> {
        let cells = generate_cells(extent, increment)?;
        info!(
            top = extent.top,
            bottom = extent.bottom,
            left = extent.left,
            right = extent.right,
            increment,
            cells = cells.ideal_count(),
            "grid generated"
        );
        Self::new(cells, options)
    }

    /// The run options.
    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// The chosen aggregation path.
    #[must_use]
    pub fn plan(&self) -> AggregatePlan {
        self.plan
    }

    /// The cells to be materialized.
    #[must_use]
    pub fn cells(&self) -> Cells {
        self.cells.clone()
    }

    /// All statements of the transaction, in execution order.
    ///
    /// Cells are turned into inserts as the iterator advances; nothing is
    /// buffered. The iterator can be requested any number of times and always
    /// yields the same sequence.
    pub fn statements(&self) -> impl Iterator<Item = Statement> + '_ {
        let PipelineOptions { input, output, .. } = &self.options;

        let truncate = self
            .options
            .destination
            .truncates()
            .then(|| emit::truncate(output));

        iter::once(emit::begin())
            .chain(truncate)
            .chain(emit::cell_setup())
            .chain(self.cells.clone().map(|cell| emit::cell_insert(&cell)))
            .chain(emit::fragment_setup())
            .chain(iter::once(emit::classify(input)))
            .chain(iter::once(emit::drop_cells()))
            .chain(self.plan.statements(output))
            .chain(iter::once(emit::drop_fragments()))
            .chain(iter::once(emit::commit()))
    }
}
