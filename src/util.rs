use std::fs;
use std::io;
use std::path::Path;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();

/// Install the fmt subscriber, filtered by `RUST_LOG` (default `info`). Later calls are no-ops.
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
    });
}

/// Remove a file. Succeeds if the file doesn't exist.
pub(crate) fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
