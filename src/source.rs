//! Read-only SQLite source: table lookup, row counts, and a streamed batch reader.

use crate::error::{PreprocessError, Result};
use crate::value::{Column, ColumnType};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One fetch worth of raw rows; every row has one value per column.
#[derive(Clone, Debug)]
pub struct Batch {
    pub columns: Arc<[Column]>,
    pub rows: Vec<Vec<Value>>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct SqliteSource {
    conn: Connection,
    path: PathBuf,
}

/// Copy a borrowed cell out of the cursor. TEXT that isn't valid UTF-8 is a
/// read failure for the whole table.
fn owned_value(table: &str, v: ValueRef<'_>) -> Result<Value> {
    Ok(match v {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(b) => {
            let s = std::str::from_utf8(b)
                .map_err(|e| PreprocessError::extraction(table, rusqlite::Error::Utf8Error(e)))?;
            Value::Text(s.to_string())
        }
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    })
}

/// Quote an identifier for interpolation into SQL.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl SqliteSource {
    /// Open an existing database read-only. A missing file is an error, never
    /// an empty database.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI,
        )
        .map_err(|source| PreprocessError::SourceOpen { path: path.to_path_buf(), source })?;
        tracing::debug!(path = %path.display(), "opened source database");
        Ok(Self { conn, path: path.to_path_buf() })
    }

    /// Wrap an already-open connection (in-memory fixtures, callers owning the handle).
    pub fn from_connection(conn: Connection) -> Self {
        let path = conn.path().map(PathBuf::from).unwrap_or_default();
        Self { conn, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let hit: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1 COLLATE NOCASE LIMIT 1",
                [table],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| PreprocessError::extraction(table, e))?;
        Ok(hit.is_some())
    }

    /// Fail with a schema error unless `table` exists.
    pub fn require_table(&self, table: &str) -> Result<()> {
        if self.table_exists(table)? {
            Ok(())
        } else {
            Err(PreprocessError::Schema { table: table.to_string() })
        }
    }

    pub fn row_count(&self, table: &str) -> rusqlite::Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let n: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(n.max(0) as u64)
    }

    /// Stream every row of `table` in storage order, handing batches of at most
    /// `chunk_size` rows to `on_batch`. The final batch may be shorter; an empty
    /// table produces no batches. Returns the number of rows read.
    pub fn for_each_batch<F>(&self, table: &str, chunk_size: usize, mut on_batch: F) -> Result<u64>
    where
        F: FnMut(Batch) -> Result<()>,
    {
        let chunk_size = chunk_size.max(1);
        let sql = format!("SELECT * FROM {}", quote_ident(table));
        let mut stmt = self.conn.prepare(&sql).map_err(|e| PreprocessError::extraction(table, e))?;

        let columns: Arc<[Column]> = stmt
            .columns()
            .iter()
            .map(|c| Column { name: c.name().to_string(), ty: ColumnType::from_decl_type(c.decl_type()) })
            .collect::<Vec<_>>()
            .into();
        let width = columns.len();

        let mut rows = stmt.query([]).map_err(|e| PreprocessError::extraction(table, e))?;
        let mut buf: Vec<Vec<Value>> = Vec::with_capacity(chunk_size.min(16 * 1024));
        let mut total: u64 = 0;

        while let Some(row) = rows.next().map_err(|e| PreprocessError::extraction(table, e))? {
            let mut vals = Vec::with_capacity(width);
            for i in 0..width {
                let v = row.get_ref(i).map_err(|e| PreprocessError::extraction(table, e))?;
                vals.push(owned_value(table, v)?);
            }
            buf.push(vals);
            total += 1;

            if buf.len() == chunk_size {
                let rows_out = std::mem::replace(&mut buf, Vec::with_capacity(chunk_size.min(16 * 1024)));
                on_batch(Batch { columns: columns.clone(), rows: rows_out })?;
            }
        }
        if !buf.is_empty() {
            on_batch(Batch { columns, rows: buf })?;
        }
        Ok(total)
    }
}
