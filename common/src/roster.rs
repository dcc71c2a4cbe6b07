//! Staff roster: the records returned by `/api/staff-list` and the
//! in-memory store rebuilt from each poll.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::media::is_valid_media_path;
use crate::timefmt::parse_timestamp;

// ─── Wire types ──────────────────────────────────────────────────────────────

/// Recording state reported by the staff workstation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingStatus {
    Active,
    Idle,
    #[default]
    Inactive,
    #[serde(other)]
    Unknown,
}

impl RecordingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Idle => "Idle",
            Self::Inactive => "Inactive",
            Self::Unknown => "Unknown",
        }
    }

    /// CSS modifier for the status dot.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Active => "status-indicator status-active",
            Self::Idle => "status-indicator status-idle",
            Self::Inactive => "status-indicator status-inactive",
            Self::Unknown => "status-indicator status-unknown",
        }
    }
}

fn unknown_name() -> String {
    "Unknown User".into()
}

fn unassigned() -> String {
    "Unassigned".into()
}

/// Last-known status of one monitored workstation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffRecord {
    /// Filled from the `staffData` key when the payload omits it.
    #[serde(default)]
    pub id: String,
    #[serde(default = "unknown_name")]
    pub name: String,
    #[serde(default = "unassigned")]
    pub division: String,
    #[serde(default)]
    pub recording_status: RecordingStatus,
    /// Raw ISO timestamp as sent by the backend.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub screenshot_path: Option<String>,
    #[serde(default)]
    pub video_path: Option<String>,
    #[serde(default)]
    pub last_5min_video: Option<String>,
}

impl StaffRecord {
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }

    pub fn has_screenshot(&self) -> bool {
        is_valid_media_path(self.screenshot_path.as_deref())
    }

    pub fn has_video(&self) -> bool {
        is_valid_media_path(self.video_path.as_deref())
    }

    pub fn is_recording(&self) -> bool {
        self.recording_status == RecordingStatus::Active
    }
}

/// Body of `GET /api/staff-list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffListResponse {
    #[serde(default)]
    pub staff_list: Vec<String>,
    #[serde(default)]
    pub staff_data: HashMap<String, StaffRecord>,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Roster snapshot: replaced wholesale on every poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    order: Vec<String>,
    records: HashMap<String, StaffRecord>,
    listed: usize,
    fetched_at: Option<DateTime<Utc>>,
}

/// Header counters for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterStats {
    pub total: usize,
    pub active: usize,
    pub with_screenshot: usize,
}

impl Roster {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the store from an API response, keeping the server's ordering.
    /// Ids listed without data are skipped.
    pub fn from_response(resp: StaffListResponse, fetched_at: DateTime<Utc>) -> Self {
        let StaffListResponse {
            staff_list,
            staff_data,
        } = resp;

        let mut records = HashMap::with_capacity(staff_data.len());
        for (id, mut record) in staff_data {
            if record.id.is_empty() {
                record.id = id.clone();
            }
            records.insert(id, record);
        }

        let mut order = Vec::with_capacity(staff_list.len());
        for id in &staff_list {
            if !records.contains_key(id) {
                warn!("No data found for staff ID: {id}");
                continue;
            }
            if !order.contains(id) {
                order.push(id.clone());
            }
        }

        Self {
            order,
            records,
            listed: staff_list.len(),
            fetched_at: Some(fetched_at),
        }
    }

    pub fn get(&self, id: &str) -> Option<&StaffRecord> {
        self.records.get(id)
    }

    /// Records in server order.
    pub fn iter(&self) -> impl Iterator<Item = &StaffRecord> + '_ {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of ids the server listed, including ones without data.
    pub fn listed_count(&self) -> usize {
        self.listed
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Distinct divisions for the filter dropdown.
    pub fn divisions(&self) -> Vec<String> {
        distinct(self.iter().map(|r| r.division.as_str()))
    }

    /// Distinct names for the filter dropdown.
    pub fn names(&self) -> Vec<String> {
        distinct(self.iter().map(|r| r.name.as_str()))
    }

    pub fn stats(&self) -> RosterStats {
        RosterStats {
            total: self.listed,
            active: self.iter().filter(|r| r.is_recording()).count(),
            with_screenshot: self.iter().filter(|r| r.has_screenshot()).count(),
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "staffList": ["pc_2", "pc_1", "ghost"],
        "staffData": {
            "pc_1": {
                "name": "Ayse",
                "division": "Finance",
                "recording_status": "active",
                "timestamp": "2024-05-01T10:20:30",
                "screenshot_path": "/screenshots/pc_1/latest.jpg",
                "video_path": "null"
            },
            "pc_2": {
                "id": "pc_2",
                "division": "IT",
                "recording_status": "paused",
                "timestamp": "2024-05-01T10:20:00"
            }
        }
    }"#;

    fn roster() -> Roster {
        let resp: StaffListResponse = serde_json::from_str(PAYLOAD).unwrap();
        Roster::from_response(resp, Utc::now())
    }

    #[test]
    fn test_decode_defaults() {
        let r = roster();
        let pc2 = r.get("pc_2").unwrap();
        assert_eq!(pc2.name, "Unknown User");
        assert_eq!(pc2.recording_status, RecordingStatus::Unknown);
        assert!(!pc2.has_screenshot());

        let pc1 = r.get("pc_1").unwrap();
        assert_eq!(pc1.id, "pc_1");
        assert!(pc1.has_screenshot());
        assert!(!pc1.has_video());
    }

    #[test]
    fn test_order_skips_missing() {
        let r = roster();
        assert_eq!(r.ids(), ["pc_2".to_string(), "pc_1".to_string()]);
        assert_eq!(r.len(), 2);
        assert_eq!(r.listed_count(), 3);
    }

    #[test]
    fn test_stats_and_options() {
        let r = roster();
        assert_eq!(
            r.stats(),
            RosterStats { total: 3, active: 1, with_screenshot: 1 }
        );
        assert_eq!(r.divisions(), ["Finance", "IT"]);
        assert_eq!(r.names(), ["Ayse", "Unknown User"]);
    }

    #[test]
    fn test_empty_payload() {
        let resp: StaffListResponse = serde_json::from_str("{}").unwrap();
        let r = Roster::from_response(resp, Utc::now());
        assert!(r.is_empty());
        assert_eq!(r.stats(), RosterStats::default());
    }
}
