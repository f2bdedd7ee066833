//! End-to-end scenarios for the boundary pipeline.
//!
//! Covers the contract between the geometry collection and the reconciled
//! table:
//! - cells with fewer than three transcripts never get a polygon
//! - every non-empty output key names a polygon and every polygon has rows
//! - multi-part shapes resolve to their largest part
//! - a failing or panicking cell does not affect the others
//! - runs are deterministic

use approx::assert_relative_eq;
use cellbound::prelude::*;

// =============================================================================
// HELPERS
// =============================================================================

fn config(alpha: f64) -> PipelineConfig {
    PipelineConfigBuilder::default()
        .alpha(alpha)
        .workers(3_usize)
        .build()
        .unwrap()
}

fn square_with_centre(cell: &str, x0: f64, y0: f64, side: f64) -> Vec<(Point, Option<CellId>)> {
    let h = side / 2.0;
    [
        (x0, y0),
        (x0 + side, y0),
        (x0 + side, y0 + side),
        (x0, y0 + side),
        (x0 + h, y0 + h),
    ]
    .into_iter()
    .map(|(x, y)| (Point::new(x, y), Some(CellId::from(cell))))
    .collect()
}

fn ring_area(polygon: &CellPolygon) -> f64 {
    let ring: Vec<Point> = polygon.exterior().iter().copied().map(Point::from).collect();
    cellbound::geometry::util::signed_ring_area(&ring).abs()
}

fn assert_consistent(table: &TranscriptTable, output: &PipelineOutput, prefix: &str) {
    let valid = output.collection.valid_cells();
    for (input, row) in table.rows().iter().zip(output.table.rows()) {
        match &input.cell {
            Some(cell) if !input.is_noise && valid.contains(cell) => {
                assert_eq!(row.cell, cell.prefixed(prefix));
                assert!(!row.is_noise);
            }
            _ => {
                assert_eq!(row.cell, "");
                assert!(row.is_noise);
            }
        }
    }
    for cell in &valid {
        let key = cell.prefixed(prefix);
        assert!(
            output.table.rows().iter().any(|row| row.cell == key),
            "polygon for {cell} has no transcript rows"
        );
    }
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn two_clusters_with_one_degenerate_cell() {
    let mut rows = vec![
        (Point::new(0.0, 0.0), Some(CellId::from("A"))),
        (Point::new(3.0, 0.0), Some(CellId::from("A"))),
        (Point::new(1.5, 3.0), Some(CellId::from("A"))),
        (Point::new(1.5, 1.0), Some(CellId::from("A"))),
        (Point::new(1.0, 0.5), Some(CellId::from("A"))),
        (Point::new(100.0, 100.0), Some(CellId::from("B"))),
        (Point::new(101.0, 100.0), Some(CellId::from("B"))),
    ];
    rows.extend([
        (Point::new(50.0, 50.0), None),
        (Point::new(60.0, 10.0), None),
        (Point::new(10.0, 60.0), None),
    ]);
    let table = TranscriptTable::from_points(rows);

    let output = run(&table, &config(0.0)).unwrap();

    assert_eq!(output.collection.len(), 1);
    let polygon = &output.collection.geometries[0];
    assert_eq!(polygon.cell, CellId::from("A"));
    assert_eq!(polygon.exterior().first(), polygon.exterior().last());
    assert_relative_eq!(ring_area(polygon), 4.5, epsilon = 1e-9);

    let cells: Vec<&str> = output.table.rows().iter().map(|r| r.cell.as_str()).collect();
    assert_eq!(
        cells,
        ["prefix-A", "prefix-A", "prefix-A", "prefix-A", "prefix-A", "", "", "", "", ""]
    );
    let noise: Vec<bool> = output.table.rows().iter().map(|r| r.is_noise).collect();
    assert_eq!(noise, [false, false, false, false, false, true, true, true, true, true]);

    assert_eq!(output.summary.valid, 1);
    assert_eq!(output.summary.degenerate, 1);
    assert_eq!(output.summary.unique_output_keys, 1);
}

#[test]
fn degenerate_cells_are_always_excluded() {
    let mut rows = square_with_centre("big", 0.0, 0.0, 4.0);
    rows.push((Point::new(10.0, 10.0), Some(CellId::from("single"))));
    rows.push((Point::new(20.0, 20.0), Some(CellId::from("pair"))));
    rows.push((Point::new(20.0, 21.0), Some(CellId::from("pair"))));
    let table = TranscriptTable::from_points(rows);

    for alpha in [0.0, 0.1, 0.4] {
        let output = run(&table, &config(alpha)).unwrap();
        let valid = output.collection.valid_cells();
        assert!(!valid.contains(&CellId::from("single")));
        assert!(!valid.contains(&CellId::from("pair")));
        assert_eq!(output.summary.degenerate, 2);
        assert_consistent(&table, &output, "prefix-");
    }
}

#[test]
fn multi_part_cell_keeps_its_largest_component() {
    let mut rows = square_with_centre("split", 0.0, 0.0, 4.0);
    rows.extend(square_with_centre("split", 100.0, 0.0, 2.0));
    let table = TranscriptTable::from_points(rows);

    let output = run(&table, &config(0.1)).unwrap();

    assert_eq!(output.collection.len(), 1);
    let polygon = &output.collection.geometries[0];
    assert_relative_eq!(ring_area(polygon), 16.0, epsilon = 1e-9);
    assert!(polygon.exterior().iter().all(|[x, y]| *x <= 4.0 && *y <= 4.0));

    // Transcripts of the discarded fragment keep the cell's key.
    assert!(output.table.rows().iter().all(|row| row.cell == "prefix-split"));
}

#[test]
fn collinear_and_over_tight_cells_are_fitting_failures() {
    let mut rows = square_with_centre("ok", 0.0, 0.0, 4.0);
    rows.extend((0..5).map(|i| (Point::new(f64::from(i), 50.0), Some(CellId::from("line")))));
    let table = TranscriptTable::from_points(rows);

    let output = run(&table, &config(0.0)).unwrap();
    assert_eq!(output.collection.valid_cells().len(), 1);
    assert_eq!(output.summary.fitting_failures, 1);

    // alpha = 1 keeps no triangle of radius 2: nothing survives.
    let tight = run(&table, &config(1.0)).unwrap();
    assert!(tight.collection.is_empty());
    assert!(tight.table.rows().iter().all(|row| row.is_noise));
    assert_eq!(tight.summary.fitting_failures, 2);
}

#[test]
fn failing_cell_does_not_affect_the_others() {
    let mut rows = Vec::new();
    for (i, name) in ["c0", "c1", "c2", "c3", "c4"].into_iter().enumerate() {
        let x0 = 10.0 * f64::from(u32::try_from(i).unwrap());
        rows.extend(square_with_centre(name, x0, 0.0, 3.0));
    }
    let table = TranscriptTable::from_points(rows);
    let cfg = config(0.0);
    let builder = BoundaryBuilder::new(cfg.alpha).unwrap();

    let baseline = run_with_fitter(&table, &cfg, &builder).unwrap();

    let panicking = |cell: &CellId, points: &PointSet| {
        assert!(*cell != CellId::from("c2"), "injected fault");
        builder.build(cell, points)
    };
    let faulted = run_with_fitter(&table, &cfg, &panicking).unwrap();

    let erroring = |cell: &CellId, points: &PointSet| {
        if *cell == CellId::from("c2") {
            Err(BoundaryFailure::EmptyShape)
        } else {
            builder.build(cell, points)
        }
    };
    let failed = run_with_fitter(&table, &cfg, &erroring).unwrap();

    let others = |collection: &GeometryCollection| -> Vec<CellPolygon> {
        collection
            .geometries
            .iter()
            .filter(|g| g.cell != CellId::from("c2"))
            .cloned()
            .collect()
    };
    assert_eq!(others(&faulted.collection), others(&baseline.collection));
    assert_eq!(others(&failed.collection), others(&baseline.collection));
    assert_eq!(faulted.collection.len(), 4);
    assert_eq!(faulted.summary.worker_faults, 1);
    assert_eq!(failed.summary.fitting_failures, 1);
    assert_consistent(&table, &faulted, "prefix-");
}

#[test]
fn runs_are_deterministic_and_relabeling_is_idempotent() {
    let mut rows = square_with_centre("a", 0.0, 0.0, 4.0);
    rows.extend(square_with_centre("b", 10.0, 0.0, 4.0));
    rows.push((Point::new(30.0, 30.0), Some(CellId::from("c"))));
    rows.push((Point::new(5.0, 5.0), None));
    let table = TranscriptTable::from_points(rows);
    let cfg = config(0.2);

    let first = run(&table, &cfg).unwrap();
    let second = run(&table, &cfg).unwrap();
    assert_eq!(first, second);

    let again = reconcile(&table, &first.collection, &cfg.prefix);
    assert_eq!(again, first.table);
    assert_eq!(reconcile(&table, &first.collection, &cfg.prefix), again);
}

#[test]
fn prefix_namespaces_output_keys() {
    let table = TranscriptTable::from_points(square_with_centre("7", 0.0, 0.0, 2.0));
    let cfg = PipelineConfigBuilder::default()
        .prefix("sample42_")
        .workers(1_usize)
        .build()
        .unwrap();
    let output = run(&table, &cfg).unwrap();
    assert!(output.table.rows().iter().all(|row| row.cell == "sample42_7"));
    // The collection keeps the bare key.
    assert_eq!(output.collection.geometries[0].cell, CellId::from("7"));
}

#[test]
fn all_noise_input_produces_empty_artifacts() {
    let table = TranscriptTable::from_points((0..4).map(|i| (Point::new(f64::from(i), 0.0), None)));
    let output = run(&table, &config(0.0)).unwrap();
    assert!(output.collection.is_empty());
    assert_eq!(output.table.len(), 4);
    assert_eq!(output.summary, RunSummary::default());
}
