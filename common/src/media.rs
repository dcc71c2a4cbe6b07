//! Media URL helpers and bounded retry chains for screenshots and videos.

use std::time::Duration;

/// 1×1 grey GIF shown once an image has exhausted its retries.
pub const PLACEHOLDER_IMAGE: &str =
    "data:image/gif;base64,R0lGODlhAQABAIAAAMLCwgAAACH5BAAAAAAALAAAAAABAAEAAAICRAEAOw==";

/// The backend writes the literal string `"null"` (or a `…/null` path) when
/// nothing has been captured yet.
pub fn is_valid_media_path(path: Option<&str>) -> bool {
    match path.map(str::trim) {
        Some(p) => !p.is_empty() && p != "null" && !p.contains("/null"),
        None => false,
    }
}

/// Path without any query string.
pub fn strip_query(path: &str) -> &str {
    path.split_once('?').map(|(p, _)| p).unwrap_or(path)
}

/// Replace any query string with a single `?t=<epoch-ms>` cache buster.
pub fn cache_busted(path: &str, epoch_ms: i64) -> String {
    format!("{}?t={epoch_ms}", strip_query(path))
}

/// Append a `retry=<epoch-ms>` marker so a retried request is never served
/// from cache.
pub fn with_retry_marker(url: &str, epoch_ms: i64) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}retry={epoch_ms}")
}

/// Resolve a backend media path against the media base URL.  Absolute and
/// `data:` URLs pass through untouched.
pub fn resolve(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("data:") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if base.is_empty() {
        format!("/{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Fallback location of the most recent recording for a staff member.
pub fn latest_video_path(staff_id: &str) -> String {
    format!("videos/{staff_id}/latest.mp4")
}

// ─── Retry policy ────────────────────────────────────────────────────────────

/// How the wait between attempts grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Constant,
    /// `base_delay × attempt`.
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Screenshots: three retries, one second apart.
    pub fn image() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            backoff: Backoff::Constant,
        }
    }

    /// Videos: three retries, waiting one second longer each time.
    pub fn video() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            backoff: Backoff::Linear,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Delay before retry number `attempt` (1-based), or `None` once the
    /// budget is spent.
    pub fn delay_before(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        Some(match self.backoff {
            Backoff::Constant => self.base_delay,
            Backoff::Linear => self.base_delay * attempt,
        })
    }
}

/// Outcome of a failed media load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { attempt: u32, delay: Duration },
    GiveUp,
}

/// Failure counter for a single media element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaAttempts {
    policy: RetryPolicy,
    failures: u32,
}

impl MediaAttempts {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, failures: 0 }
    }

    pub fn exhausted(&self) -> bool {
        self.failures > self.policy.max_attempts
    }

    /// Record a failure and decide whether to try again.
    pub fn on_failure(&mut self) -> RetryDecision {
        self.failures = self.failures.saturating_add(1);
        match self.policy.delay_before(self.failures) {
            Some(delay) => RetryDecision::Retry {
                attempt: self.failures,
                delay,
            },
            None => RetryDecision::GiveUp,
        }
    }

    /// A successful load (or a new source) restores the full budget.
    pub fn reset(&mut self) {
        self.failures = 0;
    }
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_media_path() {
        assert!(is_valid_media_path(Some("/screenshots/a/latest.jpg")));
        assert!(!is_valid_media_path(None));
        assert!(!is_valid_media_path(Some("")));
        assert!(!is_valid_media_path(Some("null")));
        assert!(!is_valid_media_path(Some("/screenshots/null")));
    }

    #[test]
    fn test_cache_busting_replaces_query() {
        assert_eq!(cache_busted("/s/a.jpg", 42), "/s/a.jpg?t=42");
        assert_eq!(cache_busted("/s/a.jpg?t=1&x=2", 42), "/s/a.jpg?t=42");
        assert_eq!(with_retry_marker("/s/a.jpg?t=42", 7), "/s/a.jpg?t=42&retry=7");
        assert_eq!(with_retry_marker("/s/a.jpg", 7), "/s/a.jpg?retry=7");
    }

    #[test]
    fn test_resolve() {
        assert_eq!(resolve("http://h:8080/", "/videos/a.mp4"), "http://h:8080/videos/a.mp4");
        assert_eq!(resolve("http://h:8080", "videos/a.mp4"), "http://h:8080/videos/a.mp4");
        assert_eq!(resolve("", "videos/a.mp4"), "/videos/a.mp4");
        assert_eq!(resolve("http://h", "https://cdn/x.jpg"), "https://cdn/x.jpg");
    }

    #[test]
    fn test_video_backoff_grows_linearly() {
        let p = RetryPolicy::video();
        assert_eq!(p.delay_before(1), Some(Duration::from_secs(1)));
        assert_eq!(p.delay_before(3), Some(Duration::from_secs(3)));
        assert_eq!(p.delay_before(4), None);
        assert_eq!(RetryPolicy::image().delay_before(3), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_attempts_terminate() {
        for policy in [RetryPolicy::image(), RetryPolicy::video(), RetryPolicy::video().with_max_attempts(0)] {
            let mut attempts = MediaAttempts::new(policy);
            let mut retries = 0;
            while let RetryDecision::Retry { .. } = attempts.on_failure() {
                retries += 1;
                assert!(retries <= policy.max_attempts);
            }
            assert_eq!(retries, policy.max_attempts);
            assert!(attempts.exhausted());
            assert_eq!(attempts.on_failure(), RetryDecision::GiveUp);
        }
    }

    #[test]
    fn test_reset_restores_budget() {
        let mut attempts = MediaAttempts::new(RetryPolicy::image());
        attempts.on_failure();
        attempts.on_failure();
        attempts.reset();
        assert_eq!(
            attempts.on_failure(),
            RetryDecision::Retry { attempt: 1, delay: Duration::from_secs(1) }
        );
    }
}
