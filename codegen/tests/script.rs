//! End-to-end checks of the rendered script text.

use gridpoly_codegen::{
    render_script, write_script, Aggregation, Destination, EmitError, Phase, Pipeline,
    PipelineOptions, ScriptConfig,
};
use gridpoly_grid::Extent;

fn config(aggregate: &str, include_truncate: bool, destination_empty: bool) -> ScriptConfig {
    ScriptConfig {
        top: 2.0,
        bottom: 0.0,
        left: 0.0,
        right: 3.0,
        increment: 1.0,
        input: Some("land_polygons.the_geom".to_string()),
        output: Some("land_grid.geom".to_string()),
        aggregate: aggregate.to_string(),
        include_truncate,
        destination_empty,
    }
}

fn render(config: &ScriptConfig) -> String {
    render_script(&config.pipeline().unwrap())
}

#[test]
fn collect_script_matches_expected_text() {
    let sql = render(&config("collect", true, false));
    let expected = "\
BEGIN;
TRUNCATE TABLE land_grid;
CREATE TEMPORARY TABLE boxes ( id serial );
SELECT AddGeometryColumn('boxes', 'box', 4326, 'POLYGON', 2);
create index boxes__box on boxes USING GIST (box);
create unique index boxes__id on boxes (id);
INSERT INTO boxes (box) VALUES (ST_SetSRID( ST_MakeBox2D(ST_Point(0.0, 0.0), ST_Point(1.0, 1.0)), 4326));
INSERT INTO boxes (box) VALUES (ST_SetSRID( ST_MakeBox2D(ST_Point(0.0, 1.0), ST_Point(1.0, 2.0)), 4326));
INSERT INTO boxes (box) VALUES (ST_SetSRID( ST_MakeBox2D(ST_Point(1.0, 0.0), ST_Point(2.0, 1.0)), 4326));
INSERT INTO boxes (box) VALUES (ST_SetSRID( ST_MakeBox2D(ST_Point(1.0, 1.0), ST_Point(2.0, 2.0)), 4326));
INSERT INTO boxes (box) VALUES (ST_SetSRID( ST_MakeBox2D(ST_Point(2.0, 0.0), ST_Point(3.0, 1.0)), 4326));
INSERT INTO boxes (box) VALUES (ST_SetSRID( ST_MakeBox2D(ST_Point(2.0, 1.0), ST_Point(3.0, 2.0)), 4326));
CREATE TEMPORARY TABLE ungrouped_output ( id serial, boxid integer );
SELECT AddGeometryColumn('ungrouped_output', 'geom', 4326, 'MULTIPOLYGON', 2);
INSERT INTO ungrouped_output (boxid, geom) SELECT boxes.id AS boxid, CASE WHEN ST_Within(boxes.box, land_polygons.the_geom) THEN ST_Multi(boxes.box) WHEN ST_Within(land_polygons.the_geom, boxes.box) THEN ST_Multi(land_polygons.the_geom) WHEN ST_Intersects(land_polygons.the_geom, boxes.box) THEN ST_CollectionExtract(ST_Multi(ST_Intersection(land_polygons.the_geom, boxes.box)), 3) ELSE NULL END AS geom FROM land_polygons JOIN boxes ON (land_polygons.the_geom && boxes.box);
DROP TABLE boxes;
INSERT into land_grid (geom) SELECT ST_Multi(ST_CollectionExtract(ST_Collect(ungrouped_output.geom), 3)) as geom FROM ungrouped_output GROUP BY boxid;
DROP TABLE ungrouped_output;
COMMIT;
";
    assert_eq!(sql, expected);
}

#[test]
fn exactly_one_transaction() {
    for (aggregate, truncate, empty) in [
        ("collect", false, false),
        ("collect", true, false),
        ("union", true, false),
        ("union", false, true),
    ] {
        let sql = render(&config(aggregate, truncate, empty));
        let lines: Vec<&str> = sql.lines().collect();
        assert_eq!(lines.iter().filter(|l| **l == "BEGIN;").count(), 1);
        assert_eq!(lines.iter().filter(|l| **l == "COMMIT;").count(), 1);
        assert_eq!(lines.first(), Some(&"BEGIN;"));
        assert_eq!(lines.last(), Some(&"COMMIT;"));
        assert!(sql.ends_with('\n'));
        assert!(lines.iter().all(|l| l.ends_with(';')));
    }
}

#[test]
fn truncate_follows_begin_only_when_requested() {
    let with = render(&config("collect", true, false));
    assert!(with.starts_with("BEGIN;\nTRUNCATE TABLE land_grid;\n"));
    assert_eq!(with.matches("TRUNCATE").count(), 1);

    let without = render(&config("collect", false, false));
    assert!(!without.contains("TRUNCATE"));
}

#[test]
fn degenerate_extent_gives_empty_but_valid_transaction() {
    let mut cfg = config("collect", false, false);
    cfg.top = 0.0;
    cfg.bottom = 0.0;
    cfg.left = 0.0;
    cfg.right = 0.0;
    let pipeline = cfg.pipeline().unwrap();
    let phases: Vec<Phase> = pipeline.statements().map(|s| s.phase).collect();
    assert!(!phases.contains(&Phase::CellInsert));
    assert_eq!(phases.first(), Some(&Phase::Begin));
    assert_eq!(phases.last(), Some(&Phase::Commit));
    assert!(phases.contains(&Phase::Classify));
    assert!(phases.contains(&Phase::Aggregate));
}

#[test]
fn two_step_union_after_truncate() {
    let sql = render(&config("union", true, false));
    let collect = sql.find("ST_Collect(ungrouped_output.geom)").unwrap();
    let update = sql
        .find("UPDATE land_grid SET geom = ST_Multi(ST_UnaryUnion(geom));")
        .unwrap();
    let drop_fragments = sql.find("DROP TABLE ungrouped_output;").unwrap();
    assert!(collect < update && update < drop_fragments);
    assert!(!sql.contains("ST_Union("));
}

#[test]
fn single_step_union_into_empty_destination() {
    let sql = render(&config("union", false, true));
    assert!(sql.contains(
        "INSERT into land_grid (geom) SELECT ST_Multi(ST_CollectionExtract(\
         ST_Union(ungrouped_output.geom), 3)) as geom FROM ungrouped_output GROUP BY boxid;"
    ));
    assert!(!sql.contains("UPDATE"));
    assert!(!sql.contains("TRUNCATE"));
}

#[test]
fn union_into_retained_destination_emits_nothing() {
    let err = config("union", false, false).pipeline().unwrap_err();
    assert!(matches!(err, EmitError::UnionIntoRetainedDestination { .. }));
}

#[test]
fn merge_aggregation_emits_nothing() {
    let err = config("merge", true, false).pipeline().unwrap_err();
    assert!(matches!(err, EmitError::UnsupportedAggregation(ref m) if m == "merge"));
}

#[test]
fn malformed_identifiers_emit_nothing() {
    let mut cfg = config("collect", false, false);
    cfg.output = Some("land_grid".to_string());
    assert!(matches!(
        cfg.pipeline(),
        Err(EmitError::InvalidTableColumnSpec { .. })
    ));
}

#[test]
fn invalid_extent_emits_nothing() {
    let mut cfg = config("collect", false, false);
    cfg.bottom = 5.0;
    assert!(matches!(cfg.pipeline(), Err(EmitError::Grid(_))));
}

#[test]
fn cell_ids_follow_column_major_order() {
    let sql = render(&config("collect", false, false));
    let boxes: Vec<&str> = sql
        .lines()
        .filter(|l| l.starts_with("INSERT INTO boxes"))
        .collect();
    assert_eq!(boxes.len(), 6);
    assert!(boxes[0].contains("ST_Point(0.0, 0.0)"));
    assert!(boxes[1].contains("ST_Point(0.0, 1.0)"));
    assert!(boxes[2].contains("ST_Point(1.0, 0.0)"));
}

#[test]
fn streamed_and_rendered_output_agree() {
    let pipeline = Pipeline::for_extent(
        Extent {
            top: 10.0,
            bottom: -10.0,
            left: -10.0,
            right: 10.0,
        },
        2.5,
        PipelineOptions {
            input: "land_polygons.the_geom".parse().unwrap(),
            output: "land_grid.geom".parse().unwrap(),
            aggregation: Aggregation::Union,
            destination: Destination::KnownEmpty,
        },
    )
    .unwrap();

    let mut buf = Vec::new();
    let written = write_script(&pipeline, &mut buf).unwrap();
    let streamed = String::from_utf8(buf).unwrap();
    assert_eq!(streamed, render_script(&pipeline));
    assert_eq!(written, streamed.lines().count());
    assert_eq!(
        streamed.lines().filter(|l| l.starts_with("INSERT INTO boxes")).count(),
        64
    );
}
