//! Timestamp parsing and "time ago" formatting.
//!
//! The backend emits naive ISO timestamps in its own local time
//! (`2024-05-01T10:20:30.123456`), occasionally RFC 3339 or epoch millis.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Placeholder shown when no clock time can be derived.
pub const NO_CLOCK: &str = "--:--:--";

/// Relative-time units, largest first.
const INTERVALS: [(&str, i64); 7] = [
    ("year", 31_536_000),
    ("month", 2_592_000),
    ("week", 604_800),
    ("day", 86_400),
    ("hour", 3_600),
    ("minute", 60),
    ("second", 1),
];

/// Parse a backend timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return local_to_utc(naive);
        }
    }
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Coarse elapsed time: seconds under a minute, minutes under an hour,
/// hours beyond that.
pub fn format_time_diff(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let diff = (now - then).num_seconds();
    if diff < 60 {
        format!("{diff} seconds")
    } else if diff < 3_600 {
        format!("{} minutes", diff / 60)
    } else {
        format!("{} hours", diff / 3_600)
    }
}

/// Human "time ago" label for a raw backend timestamp.
pub fn format_time_ago(raw: Option<&str>, now: DateTime<Utc>) -> String {
    let raw = match raw.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return "Unknown".into(),
    };
    let Some(then) = parse_timestamp(raw) else {
        return "Invalid date".into();
    };

    let seconds = (now - then).num_seconds();
    for (unit, span) in INTERVALS {
        let count = seconds / span;
        if count >= 1 {
            let plural = if count > 1 { "s" } else { "" };
            return format!("{count} {unit}{plural} ago");
        }
    }
    "Just now".into()
}

/// Local wall-clock `HH:MM:SS`.
pub fn format_clock(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Clock time embedded in a capture filename such as
/// `20240501_102030.jpg` → `10:20:30`.
pub fn filename_clock(filename: &str) -> Option<String> {
    let time_part = filename.split('_').nth(1)?;
    let digits = time_part.get(..6)?;
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}:{}:{}", &digits[..2], &digits[2..4], &digits[4..6]))
}

/// Label for a `YYYYMMDD` date key, e.g. `20240501` → `01 May 2024`.
pub fn date_key_label(key: &str) -> Option<String> {
    NaiveDate::parse_from_str(key, "%Y%m%d")
        .ok()
        .map(|d| d.format("%d %b %Y").to_string())
}

// ─── tests ───────────────────────────────────────────────────────────────
