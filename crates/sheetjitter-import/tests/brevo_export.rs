use std::path::PathBuf;

use sheetjitter_core::Cell;
use sheetjitter_import::{CAMPAIGN_COLUMNS, ImportError, campaign_table, load_campaigns};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/campaigns.json")
}

fn text(value: &str) -> Cell {
    Cell::Text(value.to_string())
}

#[test]
fn saved_pages_become_one_campaign_sheet() {
    let campaigns = load_campaigns(&fixture_path()).expect("load export");
    let table = campaign_table(&campaigns);

    assert_eq!(table.column_names(), CAMPAIGN_COLUMNS.to_vec());
    assert_eq!(table.dimensions(), (4, 18));

    let rows = table.data_rows();
    assert_eq!(rows[0][..4], [text("101"), text("March newsletter"), text("05-03-2024"), text("3, 7")]);
    assert_eq!(rows[0][7], Cell::Number(990.0));
    assert_eq!(rows[0][8], Cell::Number(1000.0));
    assert_eq!(rows[0][16..], [text("2024"), text("03")]);

    assert_eq!(rows[1][2], Cell::Empty);
    assert_eq!(rows[1][3], Cell::Empty);
    assert!(rows[1][4..16].iter().all(|cell| *cell == Cell::Number(0.0)));

    assert_eq!(rows[2][2], text("12-04-2024"));
    assert_eq!(rows[2][3], text("12"));
    assert_eq!(rows[2][17], text("04"));
}

#[test]
fn malformed_export_is_a_json_error() {
    let mut path = std::env::temp_dir();
    path.push(format!("sheetjitter_import_{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, "{\"campaigns\": [").expect("write fixture");

    let err = load_campaigns(&path).expect_err("truncated json");
    assert!(matches!(err, ImportError::Json { .. }));

    std::fs::remove_file(&path).ok();
}

#[test]
fn missing_export_is_an_io_error() {
    let err = load_campaigns(&fixture_path().with_file_name("absent.json")).expect_err("missing");
    assert!(matches!(err, ImportError::Io { .. }));
}
