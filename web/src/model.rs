//! Shared data-transfer objects used by both server and client.

use serde::{Deserialize, Serialize};

use oeks_common::protocol::ConnectionStatus;
use oeks_common::roster::Roster;

// ─── Roster ──────────────────────────────────────────────────────────────────

/// One roster poll as seen by the browser.  A failed fetch arrives as an
/// empty roster with [`ConnectionStatus::Error`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterView {
    pub roster: Roster,
    pub status: ConnectionStatus,
}

impl RosterView {
    pub fn failed() -> Self {
        Self {
            roster: Roster::empty(),
            status: ConnectionStatus::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == ConnectionStatus::Error
    }
}

// ─── Live view ───────────────────────────────────────────────────────────────

/// Tabs below the live-view media area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetailTab {
    #[default]
    Screenshots,
    Videos,
    Timeline,
}

impl DetailTab {
    pub const ALL: [DetailTab; 3] = [Self::Screenshots, Self::Videos, Self::Timeline];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Screenshots => "Screenshots",
            Self::Videos => "Videos",
            Self::Timeline => "Timeline",
        }
    }
}

/// Current time in epoch milliseconds, used for cache busting.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
