//! Realtime channel messages and connection status shared by the
//! console watcher and the dashboard.

use serde::{Deserialize, Serialize};

/// Port the tracker's WebSocket server listens on.
pub const DEFAULT_WS_PORT: u16 = 8765;

/// `ws(s)://host:port`.
pub fn websocket_url(secure: bool, host: &str, port: u16) -> String {
    let scheme = if secure { "wss" } else { "ws" };
    let host = if host.is_empty() { "localhost" } else { host };
    format!("{scheme}://{host}:{port}")
}

/// First frame sent after the socket opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub api_key: String,
    pub client_type: String,
}

impl AuthMessage {
    pub fn admin(api_key: impl Into<String>) -> Self {
        Self {
            kind: "auth".into(),
            api_key: api_key.into(),
            client_type: "admin".into(),
        }
    }
}

/// Anything the server pushes.  Only `status` is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerMessage {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ServerMessage {
    pub fn is_authenticated(&self) -> bool {
        self.status.as_deref() == Some("authenticated")
    }

    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }
}

/// What to do after the socket closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDisposition {
    /// 1000 (normal) or 1001 (going away): stay disconnected.
    Normal,
    Reconnect,
}

impl CloseDisposition {
    /// A missing close frame is an abnormal closure (1006).
    pub fn from_code(code: Option<u16>) -> Self {
        match code {
            Some(1000) | Some(1001) => Self::Normal,
            _ => Self::Reconnect,
        }
    }
}

/// Text indicator in the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
    Error,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connecting => "Connecting…",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
            Self::Error => "Connection error",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Connecting => "status-pending",
            Self::Connected => "status-online",
            Self::Disconnected | Self::Error => "status-offline",
        }
    }
}

// ─── tests ───────────────────────────────────────────────────────────────
