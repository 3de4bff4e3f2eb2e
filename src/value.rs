//! Column type classification and the "is this cell missing" predicate for
//! the SQLite type system.

use crate::date::resolve_date;
use rusqlite::types::Value;

/// Temporal flavour of a declared column type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Temporal {
    Date,
    DateTime,
}

/// Declared column type, classified by SQLite affinity rules with temporal
/// types split out first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
    Numeric,
    Temporal(Temporal),
    /// No declared type (expressions, some views).
    Untyped,
}

impl ColumnType {
    pub fn from_decl_type(decl: Option<&str>) -> Self {
        let decl = match decl {
            Some(d) if !d.trim().is_empty() => d.trim().to_ascii_uppercase(),
            _ => return ColumnType::Untyped,
        };
        if decl.contains("DATETIME") || decl.contains("TIMESTAMP") {
            return ColumnType::Temporal(Temporal::DateTime);
        }
        if decl.contains("DATE") {
            return ColumnType::Temporal(Temporal::Date);
        }
        // https://www.sqlite.org/datatype3.html#determination_of_column_affinity
        if decl.contains("INT") {
            ColumnType::Integer
        } else if decl.contains("CHAR") || decl.contains("CLOB") || decl.contains("TEXT") {
            ColumnType::Text
        } else if decl.contains("BLOB") {
            ColumnType::Blob
        } else if decl.contains("REAL") || decl.contains("FLOA") || decl.contains("DOUB") {
            ColumnType::Real
        } else {
            ColumnType::Numeric
        }
    }

    #[inline]
    pub fn is_temporal(self) -> bool {
        matches!(self, ColumnType::Temporal(_))
    }
}

/// A column of a source table: name plus classified declared type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}

/// Whether a raw cell counts as missing for its column type.
pub trait MissingValue {
    fn is_missing(&self, ty: ColumnType) -> bool;
}

impl MissingValue for Value {
    fn is_missing(&self, ty: ColumnType) -> bool {
        match self {
            Value::Null => true,
            Value::Real(f) if !f.is_finite() => true,
            // not-a-time: a temporal cell that names no calendar date
            v if ty.is_temporal() => resolve_date(v).is_none(),
            _ => false,
        }
    }
}
