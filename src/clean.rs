//! Batch cleaning: missing cells become `0`, temporal cells become `YYYY-MM-DD`,
//! everything else passes through with its type intact.

use crate::date::{format_date, resolve_date};
use crate::record::{Cell, Record, MISSING_SENTINEL};
use crate::source::Batch;
use crate::value::{ColumnType, MissingValue};
use rusqlite::types::Value;
use std::sync::Arc;

fn clean_cell(v: Value, ty: ColumnType) -> Cell {
    if v.is_missing(ty) {
        return MISSING_SENTINEL;
    }
    if ty.is_temporal() {
        // is_missing already rejected values without a calendar date
        if let Some(d) = resolve_date(&v) {
            return Cell::Text(format_date(d));
        }
    }
    match v {
        Value::Integer(n) => Cell::Integer(n),
        Value::Real(f) => Cell::Real(f),
        Value::Text(s) => Cell::Text(s),
        Value::Blob(b) => Cell::Blob(b),
        Value::Null => MISSING_SENTINEL,
    }
}

/// Clean one batch. Row count, column set, and row order are preserved.
pub fn clean_batch(batch: Batch) -> Vec<Record> {
    let names: Arc<[String]> = batch.columns.iter().map(|c| c.name.clone()).collect::<Vec<_>>().into();
    clean_batch_with_names(batch, &names)
}

/// Same as [`clean_batch`] but reuses an already-built column-name list so all
/// records of a table share one allocation.
pub(crate) fn clean_batch_with_names(batch: Batch, names: &Arc<[String]>) -> Vec<Record> {
    let Batch { columns, rows } = batch;
    rows.into_iter()
        .map(|row| {
            let cells = row
                .into_iter()
                .zip(columns.iter())
                .map(|(v, col)| clean_cell(v, col.ty))
                .collect();
            Record::new(names.clone(), cells)
        })
        .collect()
}
