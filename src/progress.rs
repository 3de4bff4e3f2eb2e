//! Progress reporting: per-table row counter bar.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

fn row_style(known_total: bool) -> ProgressStyle {
    let template = if known_total {
        "{spinner:.green} {msg} {pos}/{len} rows [{bar:.cyan/blue}] {percent:>3}%  \
         rows/s: {per_sec}  elapsed: {elapsed_precise}  eta: {eta_precise}"
    } else {
        "{spinner:.green} {msg} {pos} rows  rows/s: {per_sec}  elapsed: {elapsed_precise}"
    };
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
}

/// A small wrapper around an `indicatif` bar counting rows of one table.
/// Falls back to an open-ended counter when the row count is unknown.
pub struct ProgressScope {
    pb: ProgressBar,
}

impl ProgressScope {
    pub fn rows<T: Into<String>>(label: T, total: Option<u64>) -> Self {
        let pb = match total {
            Some(n) => ProgressBar::new(n),
            None => ProgressBar::new_spinner(),
        };
        pb.set_style(row_style(total.is_some()));
        let label = label.into();
        if !label.is_empty() {
            pb.set_message(label);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { pb }
    }

    #[inline]
    pub fn inc_rows(&self, delta: u64) {
        self.pb.inc(delta);
    }

    pub fn finish<T: Into<String>>(&self, msg: T) {
        self.pb.finish_with_message(msg.into());
    }

    pub fn abandon(&self) {
        self.pb.abandon();
    }
}
