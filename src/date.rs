//! Calendar-date resolution for temporal cells and the canonical `YYYY-MM-DD` rendering.

use regex::Regex;
use rusqlite::types::Value;
use std::sync::OnceLock;
use time::{Date, Month, OffsetDateTime};

/// Julian day number of 1970-01-01T00:00:00Z.
const UNIX_EPOCH_JULIAN_DAY: f64 = 2_440_587.5;
const SECONDS_PER_DAY: f64 = 86_400.0;

fn text_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Date prefix of ISO-8601 / SQLite text timestamps; time part and zone are ignored.
    RE.get_or_init(|| Regex::new(r"^\s*(\d{4})[-/](\d{1,2})[-/](\d{1,2})(?:[T\s].*)?$").unwrap())
}

fn date_from_text(s: &str) -> Option<Date> {
    let caps = text_date_re().captures(s)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u8 = caps[2].parse().ok()?;
    let day: u8 = caps[3].parse().ok()?;
    Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()
}

fn date_from_unix(secs: i64) -> Option<Date> {
    OffsetDateTime::from_unix_timestamp(secs).ok().map(|dt| dt.date())
}

fn date_from_julian_day(jd: f64) -> Option<Date> {
    if !jd.is_finite() {
        return None;
    }
    let secs = ((jd - UNIX_EPOCH_JULIAN_DAY) * SECONDS_PER_DAY).floor();
    if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
        return None;
    }
    date_from_unix(secs as i64)
}

/// Resolve a raw temporal cell to the calendar date it encodes.
///
/// SQLite has no native date type, so three storage conventions are accepted:
/// - TEXT starting with `YYYY-MM-DD` (or `YYYY/MM/DD`)
/// - INTEGER Unix seconds
/// - REAL Julian day numbers
///
/// Anything else, including out-of-range or impossible dates, is `None`.
pub fn resolve_date(v: &Value) -> Option<Date> {
    let date = match v {
        Value::Text(s) => date_from_text(s),
        Value::Integer(n) => date_from_unix(*n),
        Value::Real(f) => date_from_julian_day(*f),
        Value::Null | Value::Blob(_) => None,
    }?;
    (0..=9999).contains(&date.year()).then_some(date)
}

/// Render as `YYYY-MM-DD`.
pub fn format_date(d: Date) -> String {
    format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day())
}
