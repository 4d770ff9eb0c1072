use proptest::prelude::*;
use s5_core::domain::S5ErrorCategory;
use s5_core::field::{
    Column, ColumnData, DISTANCE_COLUMN, FieldDocument, FieldTable, GridDescriptor,
    TARGET_VELOCITY_COLUMN, VelocityProfile, check_rectangular, constant_velocity_document,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const VELOCITY_FIXTURE: &str = "\
Title = \"Velocity file generated by S5.HPC\"
Variables = \"Distance (km)\", \"TargetVel (km/h)\"
Zone T = \" \", I = 2, J = 1, K = 1, F = POINT
     0   69.0
  3030   69.0";

const WEATHER_FIXTURE: &str = "\
Title = \"Weather\"
Variables = \"Distance (km)\", \"Day\", \"Time (HHMM)\", \"DirectSun (W/m2)\"
#PAtm(Pa) TAtm(K)= 101325 298.15
#Datums= Darwin AliceSprings
Zone T = \"weather\", I = 2, J = 2, K = 1, F = POINT
     0      1    800  612.5
     0      1    900  700.0
  1500      1    800 580.25
  1500      1    900  690.0";

fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("fixture should be written");
    path
}

fn read_text(path: &Path) -> String {
    fs::read_to_string(path).expect("output should be readable")
}

#[test]
fn velocity_fixture_round_trips_byte_identically() {
    let temp = TempDir::new().expect("tempdir should be created");
    let input = write_fixture(&temp, "TargetVel.dat", VELOCITY_FIXTURE);
    let output = temp.path().join("copy.dat");

    let document = FieldDocument::read(&input).expect("fixture should parse");
    let diagnostics = document.write(&output, false).expect("write should succeed");

    assert!(diagnostics.is_empty());
    assert_eq!(read_text(&output), VELOCITY_FIXTURE);
    assert_eq!(document.source_path.as_deref(), Some(input.as_path()));
}

#[test]
fn weather_fixture_keeps_ambient_and_datum_lines() {
    let temp = TempDir::new().expect("tempdir should be created");
    let input = write_fixture(&temp, "weather.dat", WEATHER_FIXTURE);
    let output = temp.path().join("weather-copy.dat");

    let document = FieldDocument::read(&input).expect("fixture should parse");
    assert_eq!(document.pressure, Some(101325.0));
    assert_eq!(document.temperature, Some(298.15));
    assert_eq!(document.datum, vec!["Darwin", "AliceSprings"]);
    assert_eq!(document.zone, GridDescriptor::new("weather", 2, 2, 1, "POINT"));

    document.write(&output, true).expect("write should succeed");
    assert_eq!(read_text(&output), WEATHER_FIXTURE);

    let reread = FieldDocument::read(&output).expect("copy should parse");
    assert_eq!(reread.data, document.data);
    assert!(check_rectangular(&reread).expect("check").is_empty());
}

#[test]
fn missing_variables_line_is_a_format_error() {
    let temp = TempDir::new().expect("tempdir should be created");
    let input = write_fixture(
        &temp,
        "broken.dat",
        "Title = \"Broken\"\nZone T = \" \", I = 1, J = 1, K = 1, F = POINT\n1 2\n",
    );

    let error = FieldDocument::read(&input).expect_err("missing Variables must fail");
    assert_eq!(error.category(), S5ErrorCategory::FormatError);
    assert!(error.to_string().contains("missing variable titles"), "{error}");
}

#[test]
fn missing_file_is_an_io_error() {
    let temp = TempDir::new().expect("tempdir should be created");
    let error = FieldDocument::read(temp.path().join("absent.dat")).expect_err("absent file");
    assert_eq!(error.category(), S5ErrorCategory::IoSystemError);
}

#[test]
fn empty_document_cannot_be_written() {
    let temp = TempDir::new().expect("tempdir should be created");
    let output = temp.path().join("empty.dat");
    let error = FieldDocument::new()
        .write(&output, false)
        .expect_err("empty document must not be written");

    assert_eq!(error.category(), S5ErrorCategory::StateError);
    assert!(!output.exists());
}

#[test]
fn stale_zone_is_reported_but_still_written() {
    let temp = TempDir::new().expect("tempdir should be created");
    let input = write_fixture(&temp, "TargetVel.dat", VELOCITY_FIXTURE);
    let output = temp.path().join("stale.dat");

    let mut document = FieldDocument::read(&input).expect("fixture should parse");
    let profile = VelocityProfile::new(vec![0.0, 1000.0, 3030.0], vec![70.0, 72.5, 68.0])
        .expect("profile");
    document.data = FieldTable::from_columns(vec![
        Column::new(DISTANCE_COLUMN, ColumnData::Float(profile.distance.clone())),
        Column::new(TARGET_VELOCITY_COLUMN, ColumnData::Float(profile.value.clone())),
    ])
    .expect("table");

    let diagnostics = document.write(&output, false).expect("write should succeed");
    assert_eq!(diagnostics.len(), 1);
    assert!(read_text(&output).contains("I = 2,"));

    profile
        .store_in(&mut document, DISTANCE_COLUMN, TARGET_VELOCITY_COLUMN)
        .expect("store");
    assert!(document.write(&output, false).expect("write").is_empty());
    assert!(read_text(&output).contains("I = 3,"));
}

#[test]
fn constant_velocity_document_matches_fixture_layout() {
    let temp = TempDir::new().expect("tempdir should be created");
    let output = temp.path().join("TargetVel.dat");

    let mut document = constant_velocity_document(69.0, 3030.0).expect("document");
    document.title = "Velocity file generated by S5.HPC".to_string();
    document.write(&output, false).expect("write should succeed");

    assert_eq!(read_text(&output), VELOCITY_FIXTURE);
    assert_eq!(document.zone.ni, 2);
}

fn column_strategy(rows: usize) -> impl Strategy<Value = ColumnData> {
    prop_oneof![
        prop::collection::vec(-1_000_000i64..1_000_000, rows).prop_map(ColumnData::Integer),
        prop::collection::vec(-1.0e6f64..1.0e6, rows).prop_map(ColumnData::Float),
        prop::collection::vec("t[a-z0-9_]{0,6}", rows).prop_map(ColumnData::Text),
    ]
}

fn table_strategy() -> impl Strategy<Value = FieldTable> {
    (1usize..12, 1usize..5)
        .prop_flat_map(|(rows, columns)| {
            prop::collection::vec(("[A-Za-z][A-Za-z ()/%]{0,10}", column_strategy(rows)), columns)
        })
        .prop_filter_map("column names must be unique", |columns| {
            FieldTable::from_columns(
                columns
                    .into_iter()
                    .enumerate()
                    .map(|(index, (name, data))| Column::new(format!("{name}{index}"), data))
                    .collect(),
            )
            .ok()
        })
}

proptest! {
    #[test]
    fn written_documents_read_back_unchanged(
        table in table_strategy(),
        title in "[A-Za-z0-9 .]{1,16}",
        zone_title in "[A-Za-z0-9 ]{0,8}",
        include_datum in any::<bool>(),
    ) {
        let temp = TempDir::new().expect("tempdir should be created");
        let first = temp.path().join("first.dat");
        let second = temp.path().join("second.dat");

        let mut document = FieldDocument::from_table(title, table);
        document.zone.title = zone_title;
        document.write(&first, include_datum).expect("first write");

        let reread = FieldDocument::read(&first).expect("read back");
        prop_assert_eq!(&reread.title, &document.title);
        prop_assert_eq!(&reread.zone, &document.zone);
        prop_assert_eq!(&reread.data, &document.data);

        reread.write(&second, include_datum).expect("second write");
        prop_assert_eq!(read_text(&first), read_text(&second));
    }
}
