mod config;
mod error;
mod observer;

mod source;
mod value;
mod date;
mod record;
mod clean;
mod extract;
mod export;
mod pipeline;

mod progress;
mod mem;
mod util;

pub use crate::config::{PreprocessOptions, DEFAULT_CHUNK_SIZE, DEFAULT_LOW_MEMORY_THRESHOLD, DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_PATH, DEFAULT_TABLES};
pub use crate::error::{PreprocessError, Result};
pub use crate::observer::{NullObserver, RunObserver, TracingObserver};
pub use crate::pipeline::{Preprocessor, ProcessedData, RunSummary};

// Building blocks for callers that drive the stages themselves.
pub use crate::source::{Batch, SqliteSource};
pub use crate::value::{Column, ColumnType, MissingValue, Temporal};
pub use crate::date::{format_date, resolve_date};
pub use crate::record::{Cell, Record, MISSING_SENTINEL};
pub use crate::clean::clean_batch;
pub use crate::extract::{extract_table, ExtractSettings};
pub use crate::export::{check_table_name, output_file_name, ExportReport, ExportedTable, Exporter, MARKER_CONTENT, MARKER_FILE_NAME};

pub use crate::progress::ProgressScope;
pub use crate::util::init_tracing_once;
