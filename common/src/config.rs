//! Configuration parsing – reads a KEY=VALUE file (`tracker.conf`).
//!
//! The console watcher and the web server load the same file; each ignores
//! fields it does not need.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::history::{DEFAULT_HISTORY_LIMIT, PLAYBACK_INTERVAL};
use crate::live_view::INACTIVE_REFRESH;
use crate::protocol::{self, DEFAULT_WS_PORT};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    // ── backend ──────────────────────────────────────────────────────
    /// Base URL of the tracker REST API (`/api/staff-list`, …).
    pub api_base_url: String,
    /// Base URL that relative screenshot/video paths are resolved against.
    pub media_base_url: String,
    /// Explicit WebSocket URL; derived from the API host when unset.
    pub ws_url: Option<String>,
    pub ws_port: u16,
    pub api_key: String,
    pub http_timeout_secs: u64,

    // ── roster polling ───────────────────────────────────────────────
    /// Roster poll period; 0 disables automatic refresh.
    pub refresh_interval_secs: u64,
    pub debounce_ms: u64,
    /// A record counts as live while its timestamp is younger than this.
    pub active_window_secs: u64,

    // ── live view / history ──────────────────────────────────────────
    pub live_view_refresh_secs: u64,
    pub inactive_refresh_secs: u64,
    pub history_limit: u32,
    pub playback_interval_ms: u64,
    pub media_retry_attempts: u32,

    // ── realtime channel ─────────────────────────────────────────────
    pub reconnect_delay_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".into(),
            media_base_url: "http://localhost:8080".into(),
            ws_url: None,
            ws_port: DEFAULT_WS_PORT,
            api_key: "default_key_change_me".into(),
            http_timeout_secs: 30,
            refresh_interval_secs: 10,
            debounce_ms: 300,
            active_window_secs: 60,
            live_view_refresh_secs: 3,
            inactive_refresh_secs: INACTIVE_REFRESH.as_secs(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            playback_interval_ms: PLAYBACK_INTERVAL.as_millis() as u64,
            media_retry_attempts: 3,
            reconnect_delay_secs: 5,
        }
    }
}

impl Config {
    /// Default config path.
    pub fn default_path() -> &'static str {
        "/etc/oeks/tracker.conf"
    }

    /// WebSocket endpoint: `WS_URL` if set, otherwise the API host on
    /// `WS_PORT`, using `wss` when the API is served over https.
    pub fn websocket_url(&self) -> String {
        if let Some(url) = &self.ws_url {
            return url.clone();
        }
        let secure = self.api_base_url.starts_with("https://");
        let host = host_of(&self.api_base_url).unwrap_or("localhost");
        protocol::websocket_url(secure, host, self.ws_port)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn active_window(&self) -> Duration {
        Duration::from_secs(self.active_window_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// The part of the configuration the browser needs.
    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            media_base_url: self.media_base_url.clone(),
            refresh_interval_secs: self.refresh_interval_secs,
            debounce_ms: self.debounce_ms,
            active_window_secs: self.active_window_secs,
            live_view_refresh_secs: self.live_view_refresh_secs,
            inactive_refresh_secs: self.inactive_refresh_secs,
            history_limit: self.history_limit,
            playback_interval_ms: self.playback_interval_ms,
            media_retry_attempts: self.media_retry_attempts,
        }
    }
}

/// Browser-facing settings, shipped to the hydrated dashboard through a
/// server function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSettings {
    pub media_base_url: String,
    pub refresh_interval_secs: u64,
    pub debounce_ms: u64,
    pub active_window_secs: u64,
    pub live_view_refresh_secs: u64,
    pub inactive_refresh_secs: u64,
    pub history_limit: u32,
    pub playback_interval_ms: u64,
    pub media_retry_attempts: u32,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Config::default().dashboard_settings()
    }
}

/// Parse a `KEY=VALUE` configuration file.
///
/// Lines starting with `#` are comments.  Values may be optionally
/// double-quoted.  Unknown keys are silently ignored.
pub fn load(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config: {}", path.display()))?;

    let config = from_map(&parse_conf(&text));
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Like [`load`], but a missing file yields the defaults.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        warn!("Config {} not found – using defaults", path.display());
        return Ok(Config::default());
    }
    load(path)
}

fn from_map(map: &HashMap<String, String>) -> Config {
    let defaults = Config::default();
    let get = |key: &str| -> Option<String> { map.get(key).cloned().filter(|v| !v.is_empty()) };
    let get_u64 = |key: &str, default: u64| -> u64 {
        get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
    };
    let get_u32 = |key: &str, default: u32| -> u32 {
        get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
    };

    let api_base_url = get("API_BASE_URL")
        .map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or(defaults.api_base_url);
    let media_base_url = get("MEDIA_BASE_URL")
        .map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or_else(|| api_base_url.clone());

    Config {
        api_base_url,
        media_base_url,
        ws_url: get("WS_URL"),
        ws_port: get("WS_PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.ws_port),
        api_key: get("API_KEY").unwrap_or(defaults.api_key),
        http_timeout_secs: get_u64("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs),
        refresh_interval_secs: get_u64("REFRESH_INTERVAL_SECS", defaults.refresh_interval_secs),
        debounce_ms: get_u64("DEBOUNCE_MS", defaults.debounce_ms),
        active_window_secs: get_u64("ACTIVE_WINDOW_SECS", defaults.active_window_secs),
        live_view_refresh_secs: get_u64("LIVE_VIEW_REFRESH_SECS", defaults.live_view_refresh_secs),
        inactive_refresh_secs: get_u64("INACTIVE_REFRESH_SECS", defaults.inactive_refresh_secs),
        history_limit: get_u32("HISTORY_LIMIT", defaults.history_limit),
        playback_interval_ms: get_u64("PLAYBACK_INTERVAL_MS", defaults.playback_interval_ms),
        media_retry_attempts: get_u32("MEDIA_RETRY_ATTEMPTS", defaults.media_retry_attempts),
        reconnect_delay_secs: get_u64("RECONNECT_DELAY_SECS", defaults.reconnect_delay_secs),
    }
}

/// Parse `KEY=VALUE` lines into a map, stripping optional double-quotes.
fn parse_conf(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, val)) = line.split_once('=') {
            let key = key.trim();
            let val = val.trim().trim_matches('"');
            map.insert(key.to_string(), val.to_string());
        }
    }
    map
}

/// Host part of an `http(s)://host[:port][/path]` URL.
fn host_of(url: &str) -> Option<&str> {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    let authority = rest.split('/').next()?;
    let host = match authority.rsplit_once(':') {
        Some((h, port)) if port.chars().all(|c| c.is_ascii_digit()) => h,
        _ => authority,
    };
    (!host.is_empty()).then_some(host)
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_conf() {
        let text = r#"
# comment
API_BASE_URL="http://10.0.0.5:8080/"
API_KEY=secret
REFRESH_INTERVAL_SECS=0
"#;
        let map = parse_conf(text);
        assert_eq!(map["API_BASE_URL"], "http://10.0.0.5:8080/");
        assert_eq!(map["API_KEY"], "secret");

        let config = from_map(&map);
        assert_eq!(config.api_base_url, "http://10.0.0.5:8080");
        assert_eq!(config.media_base_url, "http://10.0.0.5:8080");
        assert_eq!(config.refresh_interval(), None);
        assert_eq!(config.debounce_ms, 300);
    }

    #[test]
    fn test_websocket_url_derived_from_api_host() {
        let config = from_map(&parse_conf("API_BASE_URL=https://tracker.example:8443\n"));
        assert_eq!(config.websocket_url(), "wss://tracker.example:8765");

        let explicit = from_map(&parse_conf("WS_URL=ws://other:9000\n"));
        assert_eq!(explicit.websocket_url(), "ws://other:9000");
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile("HISTORY_LIMIT=20\nWS_PORT=9999\n");
        let config = load(tmp.as_path()).unwrap();
        assert_eq!(config.history_limit, 20);
        assert_eq!(config.ws_port, 9999);
        assert_eq!(config.dashboard_settings().history_limit, 20);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_or_default(Path::new("/nonexistent/oeks/tracker.conf")).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.websocket_url(), "ws://localhost:8765");
        assert_eq!(config.inactive_refresh_secs, 10);
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.playback_interval_ms, 333);
    }

    #[test]
    fn test_inactive_refresh_reaches_dashboard_settings() {
        let config = from_map(&parse_conf("INACTIVE_REFRESH_SECS=25\n"));
        assert_eq!(config.dashboard_settings().inactive_refresh_secs, 25);
    }

    fn tempfile(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("oeks_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tracker.conf");
        std::fs::write(&path, content).unwrap();
        path
    }
}
