#![allow(dead_code)]

use rusqlite::{params, Connection};
use serde_json::Value;
use sqlprep::RunObserver;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Create `task.sqlite` in `dir` with the four production table names and a
/// handful of rows covering NULLs, non-finite reals, and temporal columns.
///
/// - tb_emr_surgery_info: 3 rows; row 2 has NULL `duration`, row 3 has +inf `duration`
/// - tb_encounter: 2 rows; DATE column stored as text, unix seconds, and NULL
/// - tb_person_mtr: 4 rows; `birth_date` with a time part and a bad value
/// - tb_mig_implant_description: 0 rows
pub fn make_snapshot(dir: &Path) -> PathBuf {
    let path = dir.join("task.sqlite");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE tb_emr_surgery_info (
            id INTEGER PRIMARY KEY,
            person_id INTEGER,
            surgery_date DATETIME,
            duration REAL,
            surgeon TEXT
        );
        CREATE TABLE tb_encounter (
            id INTEGER,
            person_id INTEGER,
            admit_date DATE,
            ward VARCHAR(32)
        );
        CREATE TABLE tb_person_mtr (
            person_id INTEGER,
            birth_date DATE,
            sex TEXT,
            weight REAL
        );
        CREATE TABLE tb_mig_implant_description (
            implant_id INTEGER,
            description TEXT,
            lot TEXT
        );
        "#,
    )
    .unwrap();

    conn.execute(
        "INSERT INTO tb_emr_surgery_info VALUES (1, 10, '2023-05-14 10:30:00', 95.5, 'house')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO tb_emr_surgery_info VALUES (2, 11, '2023-06-01T08:00:00', NULL, 'wilson')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO tb_emr_surgery_info VALUES (3, 12, NULL, ?1, NULL)",
        params![f64::INFINITY],
    )
    .unwrap();

    conn.execute("INSERT INTO tb_encounter VALUES (100, 10, '2022-12-31', 'A')", []).unwrap();
    // 2023-05-14T10:30:00Z as unix seconds
    conn.execute("INSERT INTO tb_encounter VALUES (101, 11, 1684060200, NULL)", []).unwrap();

    conn.execute("INSERT INTO tb_person_mtr VALUES (10, '1980-02-29 00:00:00', 'F', 61.2)", []).unwrap();
    conn.execute("INSERT INTO tb_person_mtr VALUES (11, '1975-07-04', 'M', 80)", []).unwrap();
    conn.execute("INSERT INTO tb_person_mtr VALUES (12, 'unknown', NULL, NULL)", []).unwrap();
    conn.execute("INSERT INTO tb_person_mtr VALUES (13, NULL, 'F', 55.0)", []).unwrap();

    path
}

/// Create a single-table database with `rows` sequential rows (`id`, `label`, `seen_at`).
/// Every 7th `label` is NULL so missing-value handling is spread across batches.
pub fn make_big_table(dir: &Path, table: &str, rows: u64) -> PathBuf {
    let path = dir.join(format!("{table}.sqlite"));
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE {table} (id INTEGER, label TEXT, seen_at DATETIME);
        INSERT INTO {table} (id, label, seen_at)
        WITH RECURSIVE c(x) AS (SELECT 0 UNION ALL SELECT x + 1 FROM c WHERE x < {last})
        SELECT x,
               CASE WHEN x % 7 = 0 THEN NULL ELSE 'row-' || x END,
               datetime(1700000000 + x * 3600, 'unixepoch')
        FROM c;
        "#,
        last = rows.saturating_sub(1),
    ))
    .unwrap();
    if rows == 0 {
        conn.execute(&format!("DELETE FROM {table}"), []).unwrap();
    }
    path
}

/// Parse a JSON array file into its elements.
pub fn read_json_array(path: &Path) -> Vec<Value> {
    let s = fs::read_to_string(path).unwrap();
    match serde_json::from_str::<Value>(&s).unwrap() {
        Value::Array(v) => v,
        other => panic!("{} is not a JSON array: {other}", path.display()),
    }
}

/// Names of all regular files in `dir`, sorted.
pub fn list_files(dir: &Path) -> Vec<String> {
    let mut v: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    v.sort();
    v
}

/// Observer that keeps every message for later assertions.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    pub lines: Arc<Mutex<Vec<(&'static str, String)>>>,
}

impl RecordingObserver {
    pub fn messages(&self, level: &str) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl RunObserver for RecordingObserver {
    fn info(&self, message: &str) {
        self.lines.lock().unwrap().push(("info", message.to_string()));
    }
    fn warn(&self, message: &str) {
        self.lines.lock().unwrap().push(("warn", message.to_string()));
    }
    fn error(&self, message: &str) {
        self.lines.lock().unwrap().push(("error", message.to_string()));
    }
}
