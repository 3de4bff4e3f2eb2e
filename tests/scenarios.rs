#[path = "common/mod.rs"]
mod common;

use common::*;
use serde_json::json;
use sqlprep::{
    extract_table, ExtractSettings, NullObserver, PreprocessError, Preprocessor, SqliteSource,
    DEFAULT_TABLES, MARKER_CONTENT, MARKER_FILE_NAME,
};
use std::fs;

/// Three rows, one NULL in a numeric column:
/// the output array keeps all three objects and the NULL cell becomes `0`.
#[test]
fn null_numeric_cell_becomes_zero() {
    let tmp = tempfile::tempdir().unwrap();
    let db = make_snapshot(tmp.path());
    let out = tmp.path().join("intermediate");

    Preprocessor::new()
        .source_path(&db)
        .output_dir(&out)
        .tables(["tb_emr_surgery_info"])
        .observer(NullObserver)
        .run()
        .unwrap();

    let rows = read_json_array(&out.join("tb_emr_surgery_info_preprocessed.json"));
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1]["duration"], json!(0));
    assert_eq!(rows[0]["duration"], json!(95.5));
    // +inf counts as missing too
    assert_eq!(rows[2]["duration"], json!(0));
    assert_eq!(rows[2]["surgeon"], json!(0));
}

/// A DATETIME value `2023-05-14 10:30:00` is exported as `"2023-05-14"`.
#[test]
fn datetime_is_exported_as_calendar_date() {
    let tmp = tempfile::tempdir().unwrap();
    let db = make_snapshot(tmp.path());
    let out = tmp.path().join("out");

    Preprocessor::new()
        .source_path(&db)
        .output_dir(&out)
        .tables(["tb_emr_surgery_info", "tb_encounter"])
        .observer(NullObserver)
        .run()
        .unwrap();

    let surgery = read_json_array(&out.join("tb_emr_surgery_info_preprocessed.json"));
    assert_eq!(surgery[0]["surgery_date"], json!("2023-05-14"));
    assert_eq!(surgery[1]["surgery_date"], json!("2023-06-01"));
    assert_eq!(surgery[2]["surgery_date"], json!(0));

    let encounters = read_json_array(&out.join("tb_encounter_preprocessed.json"));
    assert_eq!(encounters[0]["admit_date"], json!("2022-12-31"));
    // stored as unix seconds
    assert_eq!(encounters[1]["admit_date"], json!("2023-05-14"));
}

/// 250,000 rows with a 100,000-row batch size: three batches (100k, 100k, 50k),
/// reported cumulatively, and all rows come back in source order.
#[test]
fn large_table_is_read_in_three_batches() {
    let tmp = tempfile::tempdir().unwrap();
    let db = make_big_table(tmp.path(), "big", 250_000);
    let source = SqliteSource::open(&db).unwrap();
    let observer = RecordingObserver::default();

    let records = extract_table(
        &source,
        "big",
        ExtractSettings { chunk_size: 100_000, ..Default::default() },
        &observer,
    )
    .unwrap();

    assert_eq!(records.len(), 250_000);
    let progress: Vec<String> = observer
        .messages("info")
        .into_iter()
        .filter(|m| m.starts_with("Processed "))
        .collect();
    assert_eq!(
        progress,
        vec![
            "Processed 100000 rows of big".to_string(),
            "Processed 200000 rows of big".to_string(),
            "Processed 250000 rows of big".to_string(),
        ]
    );
    assert!(observer.messages("info").contains(&"Total rows in big: 250000".to_string()));

    for (i, r) in records.iter().enumerate() {
        assert_eq!(r.get("id"), Some(&sqlprep::Cell::Integer(i as i64)), "row {i} out of order");
    }
}

/// A configured table missing from the source aborts the run before anything
/// is written: the output directory is never created and no marker appears.
#[test]
fn missing_table_aborts_without_output() {
    let tmp = tempfile::tempdir().unwrap();
    let db = make_snapshot(tmp.path());
    let out = tmp.path().join("intermediate");
    let observer = RecordingObserver::default();

    let err = Preprocessor::new()
        .source_path(&db)
        .output_dir(&out)
        .tables(["tb_encounter", "tb_does_not_exist", "tb_person_mtr"])
        .observer(observer.clone())
        .run()
        .unwrap_err();

    match err {
        PreprocessError::Schema { table } => assert_eq!(table, "tb_does_not_exist"),
        other => panic!("expected schema error, got {other:?}"),
    }
    assert!(!out.exists(), "output dir must not be created on schema failure");

    let errors = observer.messages("error");
    assert_eq!(errors.len(), 1, "exactly one terminal failure message");
    assert!(errors[0].contains("tb_does_not_exist"));
    // validation happens before any table is read
    assert!(!observer.messages("info").iter().any(|m| m.starts_with("Processing table")));
}

/// All four configured tables succeed: exactly four JSON files plus the marker,
/// and the marker is the most recently modified file.
#[test]
fn four_tables_produce_four_files_and_marker() {
    let tmp = tempfile::tempdir().unwrap();
    let db = make_snapshot(tmp.path());
    let out = tmp.path().join("intermediate");

    let summary = Preprocessor::new()
        .source_path(&db)
        .output_dir(&out)
        .tables(DEFAULT_TABLES)
        .observer(NullObserver)
        .run()
        .unwrap();

    let mut expected: Vec<String> = DEFAULT_TABLES.iter().map(|t| format!("{t}_preprocessed.json")).collect();
    expected.push(MARKER_FILE_NAME.to_string());
    expected.sort();
    assert_eq!(list_files(&out), expected);

    assert_eq!(summary.tables.len(), 4);
    assert_eq!(summary.total_records, 3 + 2 + 4);
    assert_eq!(fs::read_to_string(&summary.marker_path).unwrap(), MARKER_CONTENT);

    let marker_mtime = fs::metadata(&summary.marker_path).unwrap().modified().unwrap();
    for t in &summary.tables {
        let m = fs::metadata(&t.path).unwrap().modified().unwrap();
        assert!(m <= marker_mtime, "{} modified after the marker", t.path.display());
    }

    let empty = read_json_array(&out.join("tb_mig_implant_description_preprocessed.json"));
    assert!(empty.is_empty());
}

/// A source path that does not exist is reported as an open failure, not as
/// an empty database.
#[test]
fn missing_source_file_fails_to_open() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("intermediate");

    let err = Preprocessor::new()
        .source_path(tmp.path().join("nope.sqlite"))
        .output_dir(&out)
        .observer(NullObserver)
        .run()
        .unwrap_err();

    assert!(matches!(err, PreprocessError::SourceOpen { .. }), "got {err:?}");
    assert!(!out.exists());
    assert!(!tmp.path().join("nope.sqlite").exists(), "read-only open must not create the file");
}
