//! File-level tests: CSV in, GeoJSON and reconciled CSV out.

use std::fs;

use cellbound::config::{ColumnNames, KeyEncoding, PipelineConfigBuilder};
use cellbound::core::geometry_collection::GeometryCollection;
use cellbound::core::table::CellId;
use cellbound::io::InputError;
use cellbound::io::csv_table::{read_transcripts_path, write_reconciled_path};
use cellbound::io::geojson::write_geometry_collection_path;
use cellbound::pipeline::run;
use tempfile::TempDir;

const TRANSCRIPTS: &str = "\
transcript_id,feature_name,x_location,y_location,cell_id,qv
1,ACTB,0.0,0.0,cell_b,40
2,ACTB,4.0,0.0,cell_b,40
3,GAPDH,4.0,4.0,cell_b,38
4,GAPDH,0.0,4.0,cell_b,40
5,MALAT1,2.0,2.0,cell_b,39
6,MALAT1,50.0,50.0,cell_a,40
7,ACTB,51.0,50.0,cell_a,40
8,ACTB,25.0,25.0,,40
9,GAPDH,26.0,25.0,UNASSIGNED,40
";

fn xenium_columns() -> ColumnNames {
    ColumnNames {
        x: "x_location".to_string(),
        y: "y_location".to_string(),
        cell: "cell_id".to_string(),
    }
}

fn write_input(dir: &TempDir, text: &str) -> std::path::PathBuf {
    let path = dir.path().join("transcripts.csv");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn csv_to_geojson_and_reconciled_csv() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, TRANSCRIPTS);
    let columns = xenium_columns();
    let config = PipelineConfigBuilder::default()
        .workers(2_usize)
        .columns(columns.clone())
        .build()
        .unwrap();

    let table = read_transcripts_path(&input, &columns).unwrap();
    assert_eq!(table.len(), 9);
    assert_eq!(table.noise_count(), 1);

    let output = run(&table, &config).unwrap();
    let geojson = dir.path().join("cells.json");
    let csv_out = dir.path().join("transcripts_out.csv");
    write_geometry_collection_path(&geojson, &output.collection).unwrap();
    write_reconciled_path(&csv_out, &output.table).unwrap();

    // "UNASSIGNED" is an ordinary key with a single transcript, hence dropped.
    let collection: GeometryCollection =
        serde_json::from_str(&fs::read_to_string(&geojson).unwrap()).unwrap();
    assert_eq!(collection.len(), 1);
    assert_eq!(collection.geometries[0].cell, CellId::from("cell_b"));
    assert_eq!(collection.geometries[0].exterior().len(), 5);

    let written = fs::read_to_string(&csv_out).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(
        lines[0],
        "transcript_id,feature_name,x_location,y_location,cell_id,qv,is_noise"
    );
    assert_eq!(lines[1], "1,ACTB,0.0,0.0,prefix-cell_b,40,False");
    assert_eq!(lines[6], "6,MALAT1,50.0,50.0,,40,True");
    assert_eq!(lines[8], "8,ACTB,25.0,25.0,,40,True");
    assert_eq!(lines.len(), 10);
}

#[test]
fn existing_noise_column_is_overwritten() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "x,y,cell,is_noise\n0,0,a,True\n2,0,a,True\n0,2,a,True\n9,9,,False\n",
    );
    let table = read_transcripts_path(&input, &ColumnNames::default()).unwrap();
    let config = PipelineConfigBuilder::default().workers(1_usize).build().unwrap();
    let output = run(&table, &config).unwrap();

    let out = dir.path().join("out.csv");
    write_reconciled_path(&out, &output.table).unwrap();
    let written = fs::read_to_string(&out).unwrap();
    assert_eq!(
        written,
        "x,y,cell,is_noise\n0,0,prefix-a,False\n2,0,prefix-a,False\n0,2,prefix-a,False\n9,9,,True\n"
    );
}

#[test]
fn category_codes_write_integer_keys() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, TRANSCRIPTS);
    let columns = xenium_columns();
    let config = PipelineConfigBuilder::default()
        .workers(1_usize)
        .columns(columns.clone())
        .key_encoding(KeyEncoding::CategoryCodes)
        .build()
        .unwrap();

    let table = read_transcripts_path(&input, &columns).unwrap();
    let output = run(&table, &config).unwrap();

    // Sorted keys: UNASSIGNED, cell_a, cell_b -> 0, 1, 2.
    assert_eq!(
        output.collection.valid_cells().into_iter().collect::<Vec<_>>(),
        vec![CellId::Code(2)]
    );
    let text = serde_json::to_string(&output.collection).unwrap();
    assert!(text.contains("\"cell\":2"));
    assert!(output.table.rows()[..5].iter().all(|row| row.cell == "prefix-2"));
}

#[test]
fn missing_input_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = read_transcripts_path(&dir.path().join("absent.csv"), &ColumnNames::default())
        .unwrap_err();
    assert!(matches!(err, InputError::Open { .. }));
}

#[test]
fn missing_column_names_the_column() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, TRANSCRIPTS);
    let err = read_transcripts_path(&input, &ColumnNames::default()).unwrap_err();
    assert!(err.to_string().contains("'x'"), "{err}");
}
