use sqlprep::{init_tracing_once, Preprocessor, DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_PATH, DEFAULT_TABLES};
use std::process::ExitCode;

fn main() -> ExitCode {
    init_tracing_once();

    // a failed run has already been logged by the observer
    let Ok(summary) = Preprocessor::new()
        .source_path(DEFAULT_SOURCE_PATH)
        .output_dir(DEFAULT_OUTPUT_DIR)
        .tables(DEFAULT_TABLES)
        .run()
    else {
        return ExitCode::FAILURE;
    };

    tracing::debug!(
        tables = summary.tables.len(),
        records = summary.total_records,
        marker = %summary.marker_path.display(),
        "run summary"
    );
    ExitCode::SUCCESS
}
