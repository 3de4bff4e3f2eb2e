use crate::config::PreprocessOptions;
use crate::error::Result;
use crate::export::{check_table_name, ExportReport, ExportedTable, Exporter};
use crate::extract::{extract_table, ExtractSettings};
use crate::observer::{RunObserver, TracingObserver};
use crate::record::Record;
use crate::source::SqliteSource;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Cleaned datasets keyed by table name, in processing order.
#[derive(Clone, Debug, Default)]
pub struct ProcessedData {
    tables: Vec<(String, Vec<Record>)>,
}

impl ProcessedData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a table. A repeated name replaces the earlier dataset in place.
    pub fn insert(&mut self, table: impl Into<String>, records: Vec<Record>) {
        let table = table.into();
        match self.tables.iter_mut().find(|(t, _)| *t == table) {
            Some((_, slot)) => *slot = records,
            None => self.tables.push((table, records)),
        }
    }

    pub fn get(&self, table: &str) -> Option<&[Record]> {
        self.tables.iter().find(|(t, _)| t == table).map(|(_, r)| r.as_slice())
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|(t, _)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn total_records(&self) -> usize {
        self.tables.iter().map(|(_, r)| r.len()).sum()
    }
}

impl IntoIterator for ProcessedData {
    type Item = (String, Vec<Record>);
    type IntoIter = std::vec::IntoIter<(String, Vec<Record>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_iter()
    }
}

/// What a successful run left on disk.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub tables: Vec<ExportedTable>,
    pub total_records: usize,
    pub marker_path: PathBuf,
}

impl RunSummary {
    fn from_report(output_dir: &Path, report: ExportReport) -> Self {
        let total_records = report.tables.iter().map(|t| t.records).sum();
        Self {
            output_dir: output_dir.to_path_buf(),
            tables: report.tables,
            total_records,
            marker_path: report.marker_path,
        }
    }
}

/// One-shot snapshot-to-JSON bridge: extract every configured table, then
/// export them all and drop the completion marker.
#[derive(Clone)]
pub struct Preprocessor {
    pub(crate) opts: PreprocessOptions,
    observer: Arc<dyn RunObserver>,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Preprocessor {
    pub fn new() -> Self {
        Self { opts: PreprocessOptions::default(), observer: Arc::new(TracingObserver) }
    }

    pub fn with_options(opts: PreprocessOptions) -> Self {
        Self { opts, observer: Arc::new(TracingObserver) }
    }

    // -------- Builder methods --------
    pub fn source_path(mut self, path: impl AsRef<Path>) -> Self { self.opts = self.opts.with_source_path(path); self }
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_output_dir(dir); self }
    pub fn chunk_size(mut self, rows: usize) -> Self { self.opts = self.opts.with_chunk_size(rows); self }
    pub fn tables<I, S>(mut self, tables: I) -> Self where I: IntoIterator<Item = S>, S: AsRef<str> { self.opts = self.opts.with_tables(tables); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn write_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_write_buffer(bytes); self }
    pub fn low_memory_threshold(mut self, fraction: f64) -> Self { self.opts = self.opts.with_low_memory_threshold(fraction); self }
    pub fn observer(mut self, observer: impl RunObserver + 'static) -> Self { self.observer = Arc::new(observer); self }

    pub fn options(&self) -> &PreprocessOptions {
        &self.opts
    }

    fn extract_settings(&self) -> ExtractSettings {
        ExtractSettings {
            chunk_size: self.opts.chunk_size,
            progress: self.opts.progress,
            low_memory_threshold: self.opts.low_memory_threshold,
        }
    }

    /// Open the configured source and extract every table.
    pub fn extract_tables(&self) -> Result<ProcessedData> {
        let source = SqliteSource::open(&self.opts.source_path)?;
        self.extract_from(&source)
    }

    /// Extract every configured table from an already-open source. All table
    /// names are checked before any rows are read.
    pub fn extract_from(&self, source: &SqliteSource) -> Result<ProcessedData> {
        for table in &self.opts.tables {
            check_table_name(table)?;
            source.require_table(table)?;
        }
        let settings = self.extract_settings();
        let mut data = ProcessedData::new();
        for table in &self.opts.tables {
            let records = extract_table(source, table, settings, self.observer.as_ref())?;
            data.insert(table.as_str(), records);
        }
        Ok(data)
    }

    /// Write `data` to the configured output directory, marker last.
    pub fn export(&self, data: ProcessedData) -> Result<ExportReport> {
        Exporter::new(&self.opts.output_dir, self.observer.as_ref())
            .write_buffer(self.opts.write_buffer_bytes)
            .export(data)
    }

    /// Extract, then export. A failure is reported once through the observer
    /// and returned; the marker is never written in that case.
    pub fn run(&self) -> Result<RunSummary> {
        self.observer.info("Starting preprocessing...");
        let res = SqliteSource::open(&self.opts.source_path)
            .and_then(|source| self.extract_from(&source))
            .and_then(|data| self.export(data));
        self.conclude(res)
    }

    /// Like [`run`](Self::run) but against a caller-owned source handle.
    pub fn run_with_source(&self, source: &SqliteSource) -> Result<RunSummary> {
        self.observer.info("Starting preprocessing...");
        let res = self.extract_from(source).and_then(|data| self.export(data));
        self.conclude(res)
    }

    fn conclude(&self, res: Result<ExportReport>) -> Result<RunSummary> {
        match res {
            Ok(report) => {
                self.observer.info("Preprocessing completed successfully");
                Ok(RunSummary::from_report(&self.opts.output_dir, report))
            }
            Err(e) => {
                tracing::debug!(kind = e.kind(), "run aborted");
                self.observer.error(&format!("Preprocessing failed: {e}"));
                Err(e)
            }
        }
    }
}
