//! Run-level observability sink handed to the extractor and exporter.

/// Receives human-readable progress and failure messages for one run.
pub trait RunObserver: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str) {
        self.info(message);
    }
    fn error(&self, message: &str);
}

/// Forwards every message to `tracing` at the matching level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }
    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }
    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl RunObserver for NullObserver {
    fn info(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}
