//! Cleaned cells and records, and their JSON rendering.

use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// One cleaned cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Integer(i64),
    Real(f64),
    Text(String),
    /// Raw bytes pass through cleaning untouched; they have no JSON form.
    Blob(Vec<u8>),
}

/// Replacement written for every missing cell.
pub const MISSING_SENTINEL: Cell = Cell::Integer(0);

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Integer(n) => s.serialize_i64(*n),
            // serde_json would silently emit `null` for these
            Cell::Real(f) if !f.is_finite() => Err(S::Error::custom(format!("non-finite number {f}"))),
            Cell::Real(f) => s.serialize_f64(*f),
            Cell::Text(t) => s.serialize_str(t),
            Cell::Blob(b) => Err(S::Error::custom(format!("{}-byte BLOB is not JSON-representable", b.len()))),
        }
    }
}

/// One cleaned row: every column of the table, in schema order.
/// Column names are shared across all records of a table.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    columns: Arc<[String]>,
    cells: Vec<Cell>,
}

impl Record {
    pub(crate) fn new(columns: Arc<[String]>, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(columns.len(), cells.len());
        Self { columns, cells }
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.columns.iter().position(|c| c == column).map(|i| &self.cells[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.columns.iter().map(String::as_str).zip(self.cells.iter())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(self.cells.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
