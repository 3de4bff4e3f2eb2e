//! Exporter: one pretty-printed JSON array per table, then the completion marker.
//!
//! The marker is the only signal downstream consumers key on. It is removed
//! before any table file is touched and written only after every table file
//! has been promoted into place, so its presence always means a complete set.

use crate::error::{PreprocessError, Result};
use crate::observer::RunObserver;
use crate::pipeline::ProcessedData;
use crate::record::Record;
use crate::util::remove_if_exists;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const MARKER_FILE_NAME: &str = "preprocessing_complete.txt";
pub const MARKER_CONTENT: &str = "Preprocessing completed successfully";

/// `<table>_preprocessed.json`
pub fn output_file_name(table: &str) -> String {
    format!("{table}_preprocessed.json")
}

/// Reject table names that can't be used as a single file name component:
/// empty, a path separator, a NUL byte, or a bare `.`/`..`.
pub fn check_table_name(table: &str) -> Result<()> {
    let bad = table.is_empty()
        || table == "."
        || table == ".."
        || table.contains(['/', '\\', '\0']);
    if bad {
        return Err(PreprocessError::InvalidTableName { table: table.to_string() });
    }
    Ok(())
}

/// One table file written by the exporter.
#[derive(Clone, Debug, Serialize)]
pub struct ExportedTable {
    pub table: String,
    pub path: PathBuf,
    pub records: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExportReport {
    pub tables: Vec<ExportedTable>,
    pub marker_path: PathBuf,
}

fn tmp_path_for(dest: &Path) -> PathBuf {
    let name = dest.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    dest.with_file_name(format!(".{name}.tmp"))
}

/// Write `body` to a sibling temp file, fsync, then rename over `dest`.
/// The temp file is removed on any failure.
fn write_atomically<F>(dest: &Path, write_buf: usize, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> Result<()>,
{
    let tmp = tmp_path_for(dest);
    let res: Result<()> = (|| {
        let f = fs::File::create(&tmp).map_err(|e| PreprocessError::io(&tmp, e))?;
        let mut w = BufWriter::with_capacity(write_buf, f);
        body(&mut w)?;
        w.flush().map_err(|e| PreprocessError::io(&tmp, e))?;
        let f = w.into_inner().map_err(|e| PreprocessError::io(&tmp, e.into_error()))?;
        f.sync_all().map_err(|e| PreprocessError::io(&tmp, e))?;
        Ok(())
    })();
    if let Err(e) = res {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(PreprocessError::io(dest, e));
    }
    tracing::debug!(path = %dest.display(), "promoted output file");
    Ok(())
}

fn write_table_json(dest: &Path, table: &str, records: &[Record], write_buf: usize) -> Result<()> {
    write_atomically(dest, write_buf, |w| {
        serde_json::to_writer_pretty(&mut *w, records).map_err(|e| {
            if e.is_io() {
                PreprocessError::io(dest, e.into())
            } else {
                PreprocessError::Serialization { table: table.to_string(), source: e }
            }
        })
    })
}

/// Persists cleaned datasets into one output directory.
pub struct Exporter<'a> {
    output_dir: PathBuf,
    write_buffer_bytes: usize,
    observer: &'a dyn RunObserver,
}

impl<'a> Exporter<'a> {
    pub fn new(output_dir: impl AsRef<Path>, observer: &'a dyn RunObserver) -> Self {
        Self { output_dir: output_dir.as_ref().to_path_buf(), write_buffer_bytes: 256 * 1024, observer }
    }

    pub fn write_buffer(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes.max(8 * 1024);
        self
    }

    pub fn marker_path(&self) -> PathBuf {
        self.output_dir.join(MARKER_FILE_NAME)
    }

    /// Write every table in iteration order, then the marker. Each dataset is
    /// dropped as soon as its file is in place.
    pub fn export(&self, data: ProcessedData) -> Result<ExportReport> {
        for table in data.table_names() {
            check_table_name(table)?;
        }

        fs::create_dir_all(&self.output_dir).map_err(|e| PreprocessError::io(&self.output_dir, e))?;

        let marker = self.marker_path();
        remove_if_exists(&marker).map_err(|e| PreprocessError::io(&marker, e))?;

        let mut tables = Vec::with_capacity(data.len());
        for (table, records) in data {
            let dest = self.output_dir.join(output_file_name(&table));
            write_table_json(&dest, &table, &records, self.write_buffer_bytes)?;
            self.observer.info(&format!("Exported {} records to {}", records.len(), dest.display()));
            tables.push(ExportedTable { table, path: dest, records: records.len() });
        }

        write_atomically(&marker, 8 * 1024, |w| {
            w.write_all(MARKER_CONTENT.as_bytes()).map_err(|e| PreprocessError::io(&marker, e))
        })?;
        tracing::debug!(path = %marker.display(), "wrote completion marker");

        Ok(ExportReport { tables, marker_path: marker })
    }
}
