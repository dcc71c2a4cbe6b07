//! 24-hour timeline layout for recorded clips.
//!
//! Positions are percentages of the day so the view can lay segments out
//! with plain `left`/`width` CSS.

use serde::{Deserialize, Serialize};

use crate::video::{VideoItem, VideoKind};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Segments are the same records as video history items.
pub type TimelineSegment = VideoItem;

/// Body of `GET /api/video-timeline/:id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineResponse {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub segments: Vec<TimelineSegment>,
}

/// `((hour*60 + minute) / 1440) * 100`, clamped to the day.  Hour and
/// minute come straight from the backend, so out-of-range values saturate.
pub fn position_percent(hour: u32, minute: u32) -> f64 {
    let minutes = hour.saturating_mul(60).saturating_add(minute).min(MINUTES_PER_DAY);
    minutes as f64 / MINUTES_PER_DAY as f64 * 100.0
}

pub fn width_percent(kind: VideoKind) -> f64 {
    kind.span_minutes() as f64 / MINUTES_PER_DAY as f64 * 100.0
}

/// A segment with its horizontal placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedSegment {
    pub left: f64,
    pub width: f64,
    pub segment: TimelineSegment,
}

impl PlacedSegment {
    pub fn covers(&self, percent: f64) -> bool {
        percent >= self.left && percent < self.left + self.width
    }
}

/// Place segments on the axis, earliest first.  Widths never spill past
/// the end of the day.
pub fn layout(segments: &[TimelineSegment]) -> Vec<PlacedSegment> {
    let mut placed: Vec<PlacedSegment> = segments
        .iter()
        .map(|s| {
            let left = position_percent(s.hour, s.minute);
            let width = width_percent(s.kind).min(100.0 - left);
            PlacedSegment {
                left,
                width,
                segment: s.clone(),
            }
        })
        .collect();
    placed.sort_by(|a, b| a.left.total_cmp(&b.left));
    placed
}

/// The clip under a click at `percent` of the bar: the latest-starting
/// segment that covers the point, so short clips win over the hourly or
/// daily clip beneath them.
pub fn segment_at(placed: &[PlacedSegment], percent: f64) -> Option<&PlacedSegment> {
    placed
        .iter()
        .filter(|p| p.covers(percent))
        .max_by(|a, b| {
            a.left
                .total_cmp(&b.left)
                .then(b.width.total_cmp(&a.width))
        })
}

/// `(hour, percent)` tick marks every `step` hours, including 24.
pub fn hour_markers(step: u32) -> Vec<(u32, f64)> {
    let step = step.clamp(1, 24) as usize;
    (0..=24u32)
        .step_by(step)
        .map(|h| (h, position_percent(h, 0)))
        .collect()
}

// ─── tests ───────────────────────────────────────────────────────────────
