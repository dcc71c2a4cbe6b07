//! Recorded video clips (5-minute, hourly, daily).

use serde::{Deserialize, Serialize};

/// Clip granularity as reported in the `type` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoKind {
    #[default]
    #[serde(rename = "5min")]
    FiveMinute,
    #[serde(rename = "hourly")]
    Hourly,
    #[serde(rename = "daily")]
    Daily,
}

impl VideoKind {
    pub const ALL: [VideoKind; 3] = [Self::FiveMinute, Self::Hourly, Self::Daily];

    /// Wire value used for the `type=` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FiveMinute => "5min",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FiveMinute => "5-minute",
            Self::Hourly => "Hourly",
            Self::Daily => "Daily",
        }
    }

    /// Length of time one clip covers.
    pub fn span_minutes(&self) -> u32 {
        match self {
            Self::FiveMinute => 5,
            Self::Hourly => 60,
            Self::Daily => 24 * 60,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == value)
    }
}

/// One recorded clip.  Also the shape of a timeline segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub path: String,
    /// Browser-friendly transcode, preferred for playback when present.
    #[serde(default)]
    pub stream_path: Option<String>,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub duration: String,
    #[serde(rename = "type", default)]
    pub kind: VideoKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub hour: u32,
    #[serde(default)]
    pub minute: u32,
}

impl VideoItem {
    pub fn playback_path(&self) -> &str {
        self.stream_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.path)
    }

    /// Explicit label, else `HH:MM`.
    pub fn display_label(&self) -> String {
        self.label
            .clone()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| format!("{:02}:{:02}", self.hour, self.minute))
    }
}

/// Body of `GET /api/staff-videos/:id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoHistoryResponse {
    /// 5-minute clips.
    #[serde(default)]
    pub videos: Vec<VideoItem>,
    #[serde(default)]
    pub hourly_videos: Vec<VideoItem>,
    #[serde(default)]
    pub daily_videos: Vec<VideoItem>,
    #[serde(default)]
    pub available_dates: Vec<String>,
}

impl VideoHistoryResponse {
    pub fn items(&self, kind: VideoKind) -> &[VideoItem] {
        match kind {
            VideoKind::FiveMinute => &self.videos,
            VideoKind::Hourly => &self.hourly_videos,
            VideoKind::Daily => &self.daily_videos,
        }
    }

    pub fn is_empty(&self) -> bool {
        VideoKind::ALL.iter().all(|k| self.items(*k).is_empty())
    }
}

// ─── tests ───────────────────────────────────────────────────────────────
