use std::time::{Duration, Instant};
use sysinfo::{System, SystemExt};

const REFRESH_EVERY: Duration = Duration::from_millis(500);

/// Fraction of RAM that is still available (0.0..1.0). 1.0 when the total is unknown.
fn available_fraction(sys: &System) -> f64 {
    let total = sys.total_memory() as f64;
    let avail = sys.available_memory() as f64;
    if total > 0.0 { (avail / total).clamp(0.0, 1.0) } else { 1.0 }
}

/// Low-memory watch for one table's accumulation.
/// - Owns its own `System`; refreshes memory at most every `REFRESH_EVERY`.
/// - Fires at most once.
/// - A threshold of 0.0 disables it and never touches sysinfo.
pub(crate) struct PressureWatch {
    threshold: f64,
    sys: Option<System>,
    last_check: Option<Instant>,
    warned: bool,
}

impl PressureWatch {
    pub(crate) fn new(threshold: f64) -> Self {
        Self { threshold, sys: None, last_check: None, warned: false }
    }

    /// Returns the available fraction the first time it falls below the
    /// threshold, `None` otherwise.
    pub(crate) fn check(&mut self) -> Option<f64> {
        if self.warned || self.threshold <= 0.0 {
            return None;
        }
        let now = Instant::now();
        if self.last_check.is_some_and(|t| now.duration_since(t) < REFRESH_EVERY) {
            return None;
        }
        self.last_check = Some(now);

        let sys = self.sys.get_or_insert_with(System::new);
        sys.refresh_memory();
        let frac = available_fraction(sys);
        if frac < self.threshold {
            self.warned = true;
            return Some(frac);
        }
        None
    }
}
