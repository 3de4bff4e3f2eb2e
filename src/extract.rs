//! Extractor: stream one table in bounded batches, clean each batch, and
//! accumulate the records in read order.

use crate::clean::clean_batch_with_names;
use crate::error::Result;
use crate::mem::PressureWatch;
use crate::observer::RunObserver;
use crate::progress::ProgressScope;
use crate::record::Record;
use crate::source::SqliteSource;
use std::sync::Arc;

/// Per-table knobs that do not affect output content.
#[derive(Clone, Copy, Debug)]
pub struct ExtractSettings {
    pub chunk_size: usize,
    pub progress: bool,
    pub low_memory_threshold: f64,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            chunk_size: crate::config::DEFAULT_CHUNK_SIZE,
            progress: false,
            low_memory_threshold: crate::config::DEFAULT_LOW_MEMORY_THRESHOLD,
        }
    }
}

/// Extract every row of `table` as cleaned records.
///
/// The row count is for logging only; failing to obtain it is a warning.
/// Any read failure aborts the whole table and nothing partial is returned.
pub fn extract_table(
    source: &SqliteSource,
    table: &str,
    settings: ExtractSettings,
    observer: &dyn RunObserver,
) -> Result<Vec<Record>> {
    source.require_table(table)?;
    observer.info(&format!("Processing table: {table}"));

    let total = match source.row_count(table) {
        Ok(n) => {
            observer.info(&format!("Total rows in {table}: {n}"));
            Some(n)
        }
        Err(e) => {
            observer.warn(&format!("Could not count rows in {table}: {e}"));
            None
        }
    };

    let pb = settings.progress.then(|| ProgressScope::rows(table, total));
    let mut watch = PressureWatch::new(settings.low_memory_threshold);
    let mut records: Vec<Record> = Vec::with_capacity(total.unwrap_or(0).min(settings.chunk_size as u64) as usize);
    let mut names: Option<Arc<[String]>> = None;

    let read = source.for_each_batch(table, settings.chunk_size, |batch| {
        let names = names.get_or_insert_with(|| batch.columns.iter().map(|c| c.name.clone()).collect::<Vec<_>>().into());
        let n = batch.len();
        records.extend(clean_batch_with_names(batch, names));

        tracing::debug!(table, batch_rows = n, "cleaned batch");
        observer.info(&format!("Processed {} rows of {table}", records.len()));
        if let Some(pb) = &pb {
            pb.inc_rows(n as u64);
        }
        if let Some(frac) = watch.check() {
            observer.warn(&format!(
                "Low memory while accumulating {table}: {:.1}% available after {} rows",
                frac * 100.0,
                records.len()
            ));
        }
        Ok(())
    });

    match read {
        Ok(_) => {
            if let Some(pb) = pb {
                pb.finish(format!("{table} done"));
            }
            Ok(records)
        }
        Err(e) => {
            if let Some(pb) = pb {
                pb.abandon();
            }
            Err(e)
        }
    }
}
