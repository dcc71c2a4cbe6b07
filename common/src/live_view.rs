//! Live-view session: which media the modal shows for the selected staff
//! member and how often it refreshes.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::media::{self, MediaAttempts, RetryDecision, RetryPolicy};
use crate::roster::{RecordingStatus, StaffRecord};
use crate::timefmt::format_time_diff;

pub const MIN_REFRESH_SECS: u64 = 3;
pub const MAX_REFRESH_SECS: u64 = 10;
/// Inactive staff only get their detail panel refreshed, by default at
/// this pace.
pub const INACTIVE_REFRESH: Duration = Duration::from_secs(10);

pub const NO_VIDEO_MESSAGE: &str = "No video recording available for this user";
pub const VIDEO_FAILED_MESSAGE: &str = "Video could not be loaded – recording may still be in progress";

/// What the modal's media area shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiveMedia {
    Video { url: String },
    Screenshot { url: String },
    Unavailable { reason: String },
}

/// Refresh timer shape while the modal is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Refresh detail and media.
    Full(Duration),
    DetailOnly(Duration),
}

impl Cadence {
    pub fn period(&self) -> Duration {
        match self {
            Self::Full(d) | Self::DetailOnly(d) => *d,
        }
    }

    pub fn refreshes_media(&self) -> bool {
        matches!(self, Self::Full(_))
    }
}

/// Detail panel contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffDetail {
    pub id: String,
    pub name: String,
    pub division: String,
    pub status: RecordingStatus,
    pub status_label: String,
    pub last_seen: String,
}

/// Media for a record: its video, else its screenshot, else a message.
pub fn choose_media(record: &StaffRecord, media_base: &str, now_ms: i64) -> LiveMedia {
    let busted = |path: &str| media::cache_busted(&media::resolve(media_base, path), now_ms);
    match (&record.video_path, &record.screenshot_path) {
        (Some(video), _) if record.has_video() => LiveMedia::Video { url: busted(video) },
        (_, Some(shot)) if record.has_screenshot() => LiveMedia::Screenshot { url: busted(shot) },
        _ => LiveMedia::Unavailable {
            reason: NO_VIDEO_MESSAGE.into(),
        },
    }
}

pub fn detail(record: &StaffRecord, now: DateTime<Utc>) -> StaffDetail {
    let last_seen = record
        .parsed_timestamp()
        .map(|ts| format!("{} ago", format_time_diff(now, ts)))
        .unwrap_or_else(|| "Unknown".into());
    StaffDetail {
        id: record.id.clone(),
        name: record.name.clone(),
        division: record.division.clone(),
        status: record.recording_status,
        status_label: record.recording_status.label().into(),
        last_seen,
    }
}

/// Outcome of a failed video load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoRetry {
    /// Load `url` after `delay`, unless the source generation moved on.
    Retry {
        delay: Duration,
        url: String,
        generation: u64,
    },
    GiveUp { message: String },
}

/// State for the open modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveViewSession {
    staff_id: String,
    refresh_rate: Duration,
    inactive_refresh: Duration,
    video_attempts: MediaAttempts,
    /// Bumped whenever a fresh source replaces the media element.
    generation: u64,
}

impl LiveViewSession {
    pub fn open(staff_id: impl Into<String>, refresh_secs: u64) -> Self {
        Self {
            staff_id: staff_id.into(),
            refresh_rate: clamp_rate(refresh_secs),
            inactive_refresh: INACTIVE_REFRESH,
            video_attempts: MediaAttempts::new(RetryPolicy::video()),
            generation: 0,
        }
    }

    /// Detail-only refresh period for staff that are not recording.  Zero
    /// keeps the default.
    pub fn with_inactive_refresh(mut self, period: Duration) -> Self {
        if !period.is_zero() {
            self.inactive_refresh = period;
        }
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.video_attempts = MediaAttempts::new(policy);
        self
    }

    pub fn staff_id(&self) -> &str {
        &self.staff_id
    }

    pub fn refresh_rate(&self) -> Duration {
        self.refresh_rate
    }

    /// Selector values outside 3–10 s are clamped.
    pub fn set_refresh_rate(&mut self, secs: u64) {
        self.refresh_rate = clamp_rate(secs);
    }

    pub fn cadence(&self, record: &StaffRecord) -> Cadence {
        if record.is_recording() {
            Cadence::Full(self.refresh_rate)
        } else {
            Cadence::DetailOnly(self.inactive_refresh)
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a retry scheduled under `generation` still targets the
    /// element on screen.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Swap in a fresh source for `record`.  Pending retries for the old
    /// element go stale; a spent budget is restored so the new element gets
    /// its own retry chain.
    pub fn refresh_media(&mut self, record: &StaffRecord, media_base: &str, now_ms: i64) -> LiveMedia {
        self.generation = self.generation.wrapping_add(1);
        let media = choose_media(record, media_base, now_ms);
        if self.video_attempts.exhausted() || !matches!(media, LiveMedia::Video { .. }) {
            self.video_attempts.reset();
        }
        media
    }

    /// The current source loaded successfully.
    pub fn media_loaded(&mut self) {
        self.video_attempts.reset();
    }

    /// Retry against the staff member's `latest.mp4`, with a growing delay,
    /// until the budget is spent.
    pub fn on_video_error(&mut self, media_base: &str, now_ms: i64) -> VideoRetry {
        match self.video_attempts.on_failure() {
            RetryDecision::Retry { delay, .. } => {
                let fallback = media::resolve(media_base, &media::latest_video_path(&self.staff_id));
                VideoRetry::Retry {
                    delay,
                    url: media::cache_busted(&fallback, now_ms),
                    generation: self.generation,
                }
            }
            RetryDecision::GiveUp => VideoRetry::GiveUp {
                message: VIDEO_FAILED_MESSAGE.into(),
            },
        }
    }
}

fn clamp_rate(secs: u64) -> Duration {
    Duration::from_secs(secs.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS))
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(status: RecordingStatus, video: Option<&str>, shot: Option<&str>) -> StaffRecord {
        StaffRecord {
            id: "pc_7".into(),
            name: "Deniz".into(),
            division: "Support".into(),
            recording_status: status,
            timestamp: "2024-05-01T11:58:00Z".into(),
            screenshot_path: shot.map(String::from),
            video_path: video.map(String::from),
            last_5min_video: None,
        }
    }

    #[test]
    fn test_media_choice_order() {
        let base = "http://tracker:8080";
        let r = record(RecordingStatus::Active, Some("videos/pc_7/latest.mp4?t=1"), Some("/s/x.jpg"));
        assert_eq!(
            choose_media(&r, base, 99),
            LiveMedia::Video { url: "http://tracker:8080/videos/pc_7/latest.mp4?t=99".into() }
        );

        let r = record(RecordingStatus::Active, Some("null"), Some("/s/x.jpg"));
        assert_eq!(
            choose_media(&r, base, 99),
            LiveMedia::Screenshot { url: "http://tracker:8080/s/x.jpg?t=99".into() }
        );

        let r = record(RecordingStatus::Active, None, Some("/screenshots/null"));
        assert!(matches!(choose_media(&r, base, 99), LiveMedia::Unavailable { .. }));
    }

    #[test]
    fn test_cadence_depends_on_recording_status() {
        let mut session = LiveViewSession::open("pc_7", 5);
        let active = record(RecordingStatus::Active, None, None);
        let idle = record(RecordingStatus::Idle, None, None);
        assert_eq!(session.cadence(&active), Cadence::Full(Duration::from_secs(5)));
        assert_eq!(session.cadence(&idle), Cadence::DetailOnly(INACTIVE_REFRESH));
        assert!(!session.cadence(&idle).refreshes_media());

        let slow = LiveViewSession::open("pc_7", 5).with_inactive_refresh(Duration::from_secs(30));
        assert_eq!(slow.cadence(&idle), Cadence::DetailOnly(Duration::from_secs(30)));
        assert_eq!(slow.cadence(&active), Cadence::Full(Duration::from_secs(5)));

        let zero = LiveViewSession::open("pc_7", 5).with_inactive_refresh(Duration::ZERO);
        assert_eq!(zero.cadence(&idle), Cadence::DetailOnly(INACTIVE_REFRESH));

        session.set_refresh_rate(1);
        assert_eq!(session.refresh_rate(), Duration::from_secs(3));
        session.set_refresh_rate(60);
        assert_eq!(session.refresh_rate(), Duration::from_secs(10));
    }

    #[test]
    fn test_video_retry_chain_terminates() {
        let mut session = LiveViewSession::open("pc_7", 3);
        let mut delays = Vec::new();
        loop {
            match session.on_video_error("", 5) {
                VideoRetry::Retry { delay, url, .. } => {
                    assert_eq!(url, "/videos/pc_7/latest.mp4?t=5");
                    delays.push(delay.as_secs());
                }
                VideoRetry::GiveUp { message } => {
                    assert_eq!(message, VIDEO_FAILED_MESSAGE);
                    break;
                }
            }
        }
        assert_eq!(delays, [1, 2, 3]);

        session.media_loaded();
        assert!(matches!(session.on_video_error("", 5), VideoRetry::Retry { .. }));
    }

    #[test]
    fn test_refresh_after_give_up_restores_budget() {
        let base = "http://tracker:8080";
        let r = record(RecordingStatus::Active, Some("/videos/pc_7/latest.mp4"), None);
        let mut session = LiveViewSession::open("pc_7", 3);

        session.refresh_media(&r, base, 1);
        while matches!(session.on_video_error(base, 2), VideoRetry::Retry { .. }) {}

        let media = session.refresh_media(&r, base, 3);
        assert!(matches!(media, LiveMedia::Video { .. }));
        match session.on_video_error(base, 4) {
            VideoRetry::Retry { delay, generation, .. } => {
                assert_eq!(delay, Duration::from_secs(1));
                assert!(session.is_current(generation));
            }
            other => panic!("expected a retry, got {other:?}"),
        }
    }

    #[test]
    fn test_refresh_makes_pending_retry_stale() {
        let base = "http://tracker:8080";
        let r = record(RecordingStatus::Active, Some("/videos/pc_7/latest.mp4"), None);
        let mut session = LiveViewSession::open("pc_7", 3);
        session.refresh_media(&r, base, 1);

        let VideoRetry::Retry { generation, .. } = session.on_video_error(base, 2) else {
            panic!("first failure should retry");
        };
        assert!(session.is_current(generation));

        session.refresh_media(&r, base, 3);
        assert!(!session.is_current(generation));
        assert_eq!(session.generation(), generation + 1);

        // Mid-chain refreshes keep counting against the same budget.
        match session.on_video_error(base, 4) {
            VideoRetry::Retry { delay, .. } => assert_eq!(delay, Duration::from_secs(2)),
            other => panic!("expected a retry, got {other:?}"),
        }
    }

    #[test]
    fn test_detail() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let d = detail(&record(RecordingStatus::Inactive, None, None), now);
        assert_eq!(d.last_seen, "2 minutes ago");
        assert_eq!(d.status_label, "Inactive");

        let mut r = record(RecordingStatus::Active, None, None);
        r.timestamp.clear();
        assert_eq!(detail(&r, now).last_seen, "Unknown");
    }
}
