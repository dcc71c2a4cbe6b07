//! Screenshot history and the sequential playback cursor.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::timefmt::{filename_clock, format_clock, parse_timestamp, NO_CLOCK};

/// Number of screenshots requested per history page.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// Playback runs at three frames per second.
pub const PLAYBACK_INTERVAL: Duration = Duration::from_millis(333);

/// A single stored screenshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub path: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub filename: String,
}

/// Body of `GET /api/staff-history/:id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    #[serde(default)]
    pub history: Vec<HistoryItem>,
    /// `YYYYMMDD` keys.
    #[serde(default)]
    pub available_dates: Vec<String>,
}

/// Date selector shared by the history, video and timeline views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateFilter {
    #[default]
    All,
    /// `YYYYMMDD`.
    Day(String),
}

impl DateFilter {
    /// `"all"` (or empty) selects everything; anything else is a day key.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "all" => Self::All,
            day => Self::Day(day.to_string()),
        }
    }

    /// Value for the `date=` query parameter, omitted for `All`.
    pub fn query_value(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Day(d) => Some(d),
        }
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Day(d) => f.write_str(d),
        }
    }
}

/// Clock label for a history item: the filename's `_HHMMSS` part when
/// present, otherwise the timestamp.
pub fn time_label(item: &HistoryItem) -> String {
    filename_clock(&item.filename)
        .or_else(|| parse_timestamp(&item.timestamp).map(format_clock))
        .unwrap_or_else(|| NO_CLOCK.to_string())
}

/// Cursor over a history page with play/pause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryPlayback {
    items: Vec<HistoryItem>,
    index: usize,
    playing: bool,
}

impl HistoryPlayback {
    pub fn new(items: Vec<HistoryItem>) -> Self {
        Self {
            items,
            index: 0,
            playing: false,
        }
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current(&self) -> Option<&HistoryItem> {
        self.items.get(self.index)
    }

    /// Jump to an item; manual selection stops playback.
    pub fn select(&mut self, index: usize) {
        if index < self.items.len() {
            self.index = index;
        }
        self.stop();
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.stop();
        self.index = (self.index + 1) % self.items.len();
    }

    pub fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.stop();
        self.index = (self.index + self.items.len() - 1) % self.items.len();
    }

    /// Playback needs at least two frames.
    pub fn start(&mut self) -> bool {
        self.playing = self.items.len() > 1;
        self.playing
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) -> bool {
        if self.playing {
            self.stop();
            false
        } else {
            self.start()
        }
    }

    /// Advance one frame (wrapping) while playing.
    pub fn tick(&mut self) {
        if self.playing && !self.items.is_empty() {
            self.index = (self.index + 1) % self.items.len();
        }
    }

    pub fn counter_label(&self) -> String {
        if self.items.is_empty() {
            "0/0".into()
        } else {
            format!("{}/{}", self.index + 1, self.items.len())
        }
    }

    pub fn progress_percent(&self) -> f64 {
        if self.items.is_empty() {
            0.0
        } else {
            (self.index + 1) as f64 / self.items.len() as f64 * 100.0
        }
    }

    pub fn current_time_label(&self) -> String {
        self.current()
            .map(time_label)
            .unwrap_or_else(|| NO_CLOCK.to_string())
    }
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<HistoryItem> {
        (0..n)
            .map(|i| HistoryItem {
                path: format!("/screenshots/pc/{i}.jpg"),
                timestamp: String::new(),
                filename: format!("20240501_1000{i:02}.jpg"),
            })
            .collect()
    }

    #[test]
    fn test_decode_response() {
        let json = r#"{"history":[{"path":"/s/1.jpg","timestamp":"2024-05-01T10:00:00","filename":"20240501_100000.jpg"}],"availableDates":["20240501"]}"#;
        let resp: HistoryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.history.len(), 1);
        assert_eq!(resp.available_dates, ["20240501"]);
    }

    #[test]
    fn test_date_filter() {
        assert_eq!(DateFilter::parse("all"), DateFilter::All);
        assert_eq!(DateFilter::parse(""), DateFilter::All);
        assert_eq!(DateFilter::parse("20240501").query_value(), Some("20240501"));
        assert_eq!(DateFilter::All.to_string(), "all");
    }

    #[test]
    fn test_navigation_wraps_and_stops_playback() {
        let mut p = HistoryPlayback::new(items(3));
        assert!(p.start());
        p.previous();
        assert!(!p.is_playing());
        assert_eq!(p.index(), 2);
        p.next();
        assert_eq!(p.index(), 0);
        p.start();
        p.select(1);
        assert!(!p.is_playing());
        assert_eq!(p.counter_label(), "2/3");
    }

    #[test]
    fn test_playback_requires_two_items() {
        let mut single = HistoryPlayback::new(items(1));
        assert!(!single.start());
        assert!(!single.toggle());

        let mut empty = HistoryPlayback::default();
        empty.next();
        empty.tick();
        assert_eq!(empty.counter_label(), "0/0");
        assert_eq!(empty.progress_percent(), 0.0);
        assert_eq!(empty.current_time_label(), NO_CLOCK);
    }

    #[test]
    fn test_tick_only_while_playing() {
        let mut p = HistoryPlayback::new(items(2));
        p.tick();
        assert_eq!(p.index(), 0);
        assert!(p.toggle());
        p.tick();
        p.tick();
        assert_eq!(p.index(), 0);
        p.tick();
        assert_eq!(p.index(), 1);
        assert_eq!(p.progress_percent(), 100.0);
    }

    #[test]
    fn test_time_label_prefers_filename() {
        let item = HistoryItem {
            path: "/s/x.jpg".into(),
            timestamp: "garbage".into(),
            filename: "20240501_235959.jpg".into(),
        };
        assert_eq!(time_label(&item), "23:59:59");

        let bare = HistoryItem {
            filename: "latest.jpg".into(),
            ..item
        };
        assert_eq!(time_label(&bare), NO_CLOCK);
    }
}
