use std::path::{Path, PathBuf};

/// Conventional mount point of the snapshot inside the preprocessing container.
pub const DEFAULT_SOURCE_PATH: &str = "/app/input/task.sqlite";
pub const DEFAULT_OUTPUT_DIR: &str = "intermediate";
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;
/// Warn when available RAM drops below this fraction while a table accumulates.
pub const DEFAULT_LOW_MEMORY_THRESHOLD: f64 = 0.10;

/// Tables exported when the caller does not supply its own list.
pub const DEFAULT_TABLES: [&str; 4] = [
    "tb_emr_surgery_info",
    "tb_encounter",
    "tb_person_mtr",
    "tb_mig_implant_description",
];

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct PreprocessOptions {
    pub source_path: PathBuf,
    pub output_dir: PathBuf,
    pub chunk_size: usize,              // rows per batch, always >= 1
    pub tables: Vec<String>,            // processing order, no duplicates
    pub progress: bool,                 // show a per-table progress bar

    pub write_buffer_bytes: usize,      // BufWriter capacity for JSON output
    pub low_memory_threshold: f64,      // available/total RAM fraction; 0.0 disables
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            chunk_size: DEFAULT_CHUNK_SIZE,
            tables: DEFAULT_TABLES.iter().map(|s| s.to_string()).collect(),
            progress: false,

            write_buffer_bytes: 256 * 1024,
            low_memory_threshold: DEFAULT_LOW_MEMORY_THRESHOLD,
        }
    }
}

impl PreprocessOptions {
    pub fn with_source_path(mut self, path: impl AsRef<Path>) -> Self {
        self.source_path = path.as_ref().to_path_buf();
        self
    }
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_chunk_size(mut self, rows: usize) -> Self {
        self.chunk_size = rows.max(1);
        self
    }
    /// Replace the table list. Names are trimmed; blanks and repeats are dropped,
    /// keeping the first occurrence so processing order stays as given.
    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for t in tables {
            let t = t.as_ref().trim();
            if t.is_empty() || out.iter().any(|seen| seen == t) {
                continue;
            }
            out.push(t.to_string());
        }
        self.tables = out;
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_write_buffer(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_low_memory_threshold(mut self, fraction: f64) -> Self {
        self.low_memory_threshold = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        self
    }
}
