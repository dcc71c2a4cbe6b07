//! Roster filtering: division, name, liveness and free-text search.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::roster::{Roster, StaffRecord};

/// Wildcard value of the division/name dropdowns.
pub const ALL: &str = "all";

/// Default freshness window for a record to count as live.
pub const ACTIVE_WINDOW: Duration = Duration::from_secs(60);

/// Liveness derived from the record timestamp (not from `recording_status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Active,
    Inactive,
}

/// `Active` iff the timestamp is younger than `window`.  Timestamps from the
/// future count as active; unparseable ones as inactive.
pub fn liveness(record: &StaffRecord, now: DateTime<Utc>, window: Duration) -> Liveness {
    let Some(ts) = record.parsed_timestamp() else {
        return Liveness::Inactive;
    };
    let age_ms = (now - ts).num_milliseconds();
    if age_ms < window.as_millis() as i64 {
        Liveness::Active
    } else {
        Liveness::Inactive
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => ALL,
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    fn admits(&self, liveness: Liveness) -> bool {
        match self {
            Self::All => true,
            Self::Active => liveness == Liveness::Active,
            Self::Inactive => liveness == Liveness::Inactive,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = std::convert::Infallible;

    /// Unknown values behave like `all`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "active" => Self::Active,
            "inactive" => Self::Inactive,
            _ => Self::All,
        })
    }
}

/// Current state of the filter controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub division: String,
    pub name: String,
    pub status: StatusFilter,
    pub search: String,
    #[serde(skip, default = "default_window")]
    pub window: Duration,
}

fn default_window() -> Duration {
    ACTIVE_WINDOW
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            division: ALL.into(),
            name: ALL.into(),
            status: StatusFilter::All,
            search: String::new(),
            window: ACTIVE_WINDOW,
        }
    }
}

impl FilterState {
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn reset(&mut self) {
        *self = Self::default().with_window(self.window);
    }

    pub fn is_default(&self) -> bool {
        self.division == ALL
            && self.name == ALL
            && self.status == StatusFilter::All
            && self.search.trim().is_empty()
    }

    /// True iff all four predicates hold.
    pub fn matches(&self, record: &StaffRecord, now: DateTime<Utc>) -> bool {
        let division_match = self.division == ALL || record.division == self.division;
        let name_match = self.name == ALL || record.name == self.name;
        let status_match = self.status.admits(liveness(record, now, self.window));
        division_match && name_match && status_match && self.search_matches(record)
    }

    fn search_matches(&self, record: &StaffRecord) -> bool {
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || record.name.to_lowercase().contains(&needle)
            || record.division.to_lowercase().contains(&needle)
            || record.id.to_lowercase().contains(&needle)
    }

    /// Keep dropdown selections that are still offered after a roster
    /// refresh; anything else falls back to `all`.
    pub fn retain_options(&mut self, divisions: &[String], names: &[String]) {
        if self.division != ALL && !divisions.contains(&self.division) {
            self.division = ALL.into();
        }
        if self.name != ALL && !names.contains(&self.name) {
            self.name = ALL.into();
        }
    }
}

/// Result of running the filter over a roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Visible ids, in roster order.
    pub visible: Vec<String>,
    /// Roster has entries but none survive the filter.
    pub show_empty_state: bool,
}

pub fn apply(roster: &Roster, filter: &FilterState, now: DateTime<Utc>) -> FilterOutcome {
    let visible: Vec<String> = roster
        .iter()
        .filter(|r| filter.matches(r, now))
        .map(|r| r.id.clone())
        .collect();
    let show_empty_state = visible.is_empty() && !roster.is_empty();
    FilterOutcome {
        visible,
        show_empty_state,
    }
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{RecordingStatus, StaffListResponse};
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn record(id: &str, name: &str, division: &str, age_secs: i64) -> StaffRecord {
        StaffRecord {
            id: id.into(),
            name: name.into(),
            division: division.into(),
            recording_status: RecordingStatus::Active,
            timestamp: (now() - ChronoDuration::seconds(age_secs)).to_rfc3339(),
            screenshot_path: None,
            video_path: None,
            last_5min_video: None,
        }
    }

    fn roster(records: Vec<StaffRecord>) -> Roster {
        let resp = StaffListResponse {
            staff_list: records.iter().map(|r| r.id.clone()).collect(),
            staff_data: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
        };
        Roster::from_response(resp, now())
    }

    #[test]
    fn test_division_and_status_example() {
        let a = record("A", "Alice", "X", 0);
        let mut filter = FilterState {
            division: "X".into(),
            status: StatusFilter::Active,
            ..Default::default()
        };
        assert!(filter.matches(&a, now()));

        filter = FilterState {
            division: "Y".into(),
            ..Default::default()
        };
        assert!(!filter.matches(&a, now()));
    }

    #[test]
    fn test_liveness_window_boundary() {
        let fresh = record("a", "n", "d", 59);
        let stale = record("b", "n", "d", 60);
        let future = record("c", "n", "d", -30);
        assert_eq!(liveness(&fresh, now(), ACTIVE_WINDOW), Liveness::Active);
        assert_eq!(liveness(&stale, now(), ACTIVE_WINDOW), Liveness::Inactive);
        assert_eq!(liveness(&future, now(), ACTIVE_WINDOW), Liveness::Active);

        let mut garbled = fresh.clone();
        garbled.timestamp = "??".into();
        assert_eq!(liveness(&garbled, now(), ACTIVE_WINDOW), Liveness::Inactive);
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_division_id() {
        let r = record("PC-141", "Mehmet Kaya", "Accounting", 0);
        for term in ["mehmet", "ACCOUNT", "pc-14", "  kaya "] {
            let f = FilterState {
                search: term.into(),
                ..Default::default()
            };
            assert!(f.matches(&r, now()), "term {term:?} should match");
        }
        let miss = FilterState {
            search: "sales".into(),
            ..Default::default()
        };
        assert!(!miss.matches(&r, now()));
    }

    #[test]
    fn test_visible_iff_all_predicates_hold() {
        let records = [
            record("1", "Ann", "Ops", 5),
            record("2", "Bob", "Ops", 600),
            record("3", "Ann", "HR", 5),
        ];
        let filters = [
            FilterState::default(),
            FilterState { division: "Ops".into(), ..Default::default() },
            FilterState { name: "Ann".into(), ..Default::default() },
            FilterState { status: StatusFilter::Inactive, ..Default::default() },
            FilterState { status: StatusFilter::Active, search: "hr".into(), ..Default::default() },
        ];
        for f in &filters {
            for r in &records {
                let expected = (f.division == ALL || f.division == r.division)
                    && (f.name == ALL || f.name == r.name)
                    && match f.status {
                        StatusFilter::All => true,
                        StatusFilter::Active => liveness(r, now(), ACTIVE_WINDOW) == Liveness::Active,
                        StatusFilter::Inactive => liveness(r, now(), ACTIVE_WINDOW) == Liveness::Inactive,
                    }
                    && (f.search.is_empty()
                        || [&r.name, &r.division, &r.id]
                            .iter()
                            .any(|v| v.to_lowercase().contains(&f.search)));
                assert_eq!(f.matches(r, now()), expected, "{f:?} vs {r:?}");
            }
        }
    }

    #[test]
    fn test_apply_reports_empty_state() {
        let r = roster(vec![record("1", "Ann", "Ops", 5), record("2", "Bob", "HR", 5)]);

        let all = apply(&r, &FilterState::default(), now());
        assert_eq!(all.visible, ["1", "2"]);
        assert!(!all.show_empty_state);

        let none = apply(
            &r,
            &FilterState { division: "Legal".into(), ..Default::default() },
            now(),
        );
        assert!(none.visible.is_empty());
        assert!(none.show_empty_state);

        let empty = apply(&Roster::empty(), &FilterState::default(), now());
        assert!(!empty.show_empty_state);
    }

    #[test]
    fn test_retain_options_and_reset() {
        let mut f = FilterState {
            division: "Ops".into(),
            name: "Gone".into(),
            search: "x".into(),
            ..Default::default()
        };
        f.retain_options(&["Ops".into()], &["Ann".into()]);
        assert_eq!(f.division, "Ops");
        assert_eq!(f.name, ALL);

        f.reset();
        assert!(f.is_default());
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!("active".parse::<StatusFilter>().unwrap(), StatusFilter::Active);
        assert_eq!("bogus".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(StatusFilter::Inactive.as_str(), "inactive");
    }
}
