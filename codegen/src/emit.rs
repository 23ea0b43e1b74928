//! Statement model and the SQL text shared by every pipeline phase.

use std::fmt;

use gridpoly_grid::Cell;

use crate::ident::TableColumn;

/// Spatial reference of every emitted geometry.
pub const SRID: u32 = 4326;

/// Transient table holding one rectangle per cell.
pub const CELL_TABLE: &str = "boxes";

/// Transient table holding one clipped fragment per (cell, input) pair.
pub const FRAGMENT_TABLE: &str = "ungrouped_output";

/// Pipeline phase a statement belongs to, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// `BEGIN;`
    Begin,
    /// Optional destination `TRUNCATE`.
    Truncate,
    /// Cell table, geometry column and indexes.
    CellSetup,
    /// One insert per generated cell.
    CellInsert,
    /// Fragment table and geometry column.
    FragmentSetup,
    /// The classify-and-clip join.
    Classify,
    /// Drop of the cell table.
    DropCells,
    /// Per-cell aggregation into the destination.
    Aggregate,
    /// Drop of the fragment table.
    DropFragments,
    /// `COMMIT;`
    Commit,
}

/// One SQL statement, terminated by `;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Phase that produced it.
    pub phase: Phase,
    /// Statement text, single line.
    pub sql: String,
}

impl Statement {
    /// Creates a statement.
    pub fn new(phase: Phase, sql: impl Into<String>) -> Self {
        Self {
            phase,
            sql: sql.into(),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Formats a coordinate as decimal text.
///
/// Integral values keep a `.0` so literals always read as floating point;
/// anything else uses the shortest representation that round-trips.
#[must_use]
pub fn coord(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Rectangle expression for `cell` in [`SRID`].
#[must_use]
pub fn box_expr(cell: &Cell) -> String {
    format!(
        "ST_SetSRID( ST_MakeBox2D(ST_Point({x}, {y}), ST_Point({next_x}, {next_y})), {SRID})",
        x = coord(cell.x_min),
        y = coord(cell.y_min),
        next_x = coord(cell.x_max),
        next_y = coord(cell.y_max),
    )
}

pub(crate) fn begin() -> Statement {
    Statement::new(Phase::Begin, "BEGIN;")
}

pub(crate) fn truncate(output: &TableColumn) -> Statement {
    Statement::new(
        Phase::Truncate,
        format!("TRUNCATE TABLE {};", output.table),
    )
}

pub(crate) fn cell_setup() -> Vec<Statement> {
    [
        format!("CREATE TEMPORARY TABLE {CELL_TABLE} ( id serial );"),
        format!("SELECT AddGeometryColumn('{CELL_TABLE}', 'box', {SRID}, 'POLYGON', 2);"),
        format!("create index {CELL_TABLE}__box on {CELL_TABLE} USING GIST (box);"),
        format!("create unique index {CELL_TABLE}__id on {CELL_TABLE} (id);"),
    ]
    .into_iter()
    .map(|sql| Statement::new(Phase::CellSetup, sql))
    .collect()
}

pub(crate) fn cell_insert(cell: &Cell) -> Statement {
    Statement::new(
        Phase::CellInsert,
        format!("INSERT INTO {CELL_TABLE} (box) VALUES ({});", box_expr(cell)),
    )
}

pub(crate) fn fragment_setup() -> Vec<Statement> {
    [
        format!("CREATE TEMPORARY TABLE {FRAGMENT_TABLE} ( id serial, boxid integer );"),
        format!(
            "SELECT AddGeometryColumn('{FRAGMENT_TABLE}', 'geom', {SRID}, 'MULTIPOLYGON', 2);"
        ),
    ]
    .into_iter()
    .map(|sql| Statement::new(Phase::FragmentSetup, sql))
    .collect()
}

/// Joins every input geometry to every cell whose bounding box it overlaps
/// and keeps one fragment per pair. The `CASE` arms are ordered cheapest
/// first:
///
/// 1. cell inside the input: the whole cell,
/// 2. input inside the cell: the whole input,
/// 3. proper intersection: the clipped polygonal parts,
/// 4. bounding boxes touch but geometries don't: `NULL`.
pub(crate) fn classify(input: &TableColumn) -> Statement {
    let table = &input.table;
    let geom = input.qualified();
    Statement::new(
        Phase::Classify,
        format!(
            "INSERT INTO {FRAGMENT_TABLE} (boxid, geom) SELECT {CELL_TABLE}.id AS boxid, CASE \
             WHEN ST_Within({CELL_TABLE}.box, {geom}) THEN ST_Multi({CELL_TABLE}.box) \
             WHEN ST_Within({geom}, {CELL_TABLE}.box) THEN ST_Multi({geom}) \
             WHEN ST_Intersects({geom}, {CELL_TABLE}.box) THEN \
             ST_CollectionExtract(ST_Multi(ST_Intersection({geom}, {CELL_TABLE}.box)), 3) \
             ELSE NULL END AS geom \
             FROM {table} JOIN {CELL_TABLE} ON ({geom} && {CELL_TABLE}.box);"
        ),
    )
}

pub(crate) fn drop_cells() -> Statement {
    Statement::new(Phase::DropCells, format!("DROP TABLE {CELL_TABLE};"))
}

pub(crate) fn drop_fragments() -> Statement {
    Statement::new(Phase::DropFragments, format!("DROP TABLE {FRAGMENT_TABLE};"))
}

pub(crate) fn commit() -> Statement {
    Statement::new(Phase::Commit, "COMMIT;")
}
