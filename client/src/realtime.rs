//! Authenticated WebSocket channel to the tracker.
//!
//! The channel only keeps the connection (and its status indicator) alive;
//! incoming frames are logged, the roster itself still comes from polling.

use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::watch;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use oeks_common::config::Config;
use oeks_common::protocol::{AuthMessage, CloseDisposition, ConnectionStatus, ServerMessage};

#[derive(Debug, Clone)]
pub struct RealtimeChannel {
    url: String,
    auth: AuthMessage,
    reconnect_delay: Duration,
}

impl RealtimeChannel {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth: AuthMessage::admin(api_key),
            reconnect_delay: Duration::from_secs(5),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.websocket_url(), config.api_key.clone())
            .with_reconnect_delay(config.reconnect_delay())
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Connect, authenticate and stay connected until the server closes
    /// normally (1000/1001) or `shutdown` flips to `true`.  Every other
    /// disconnect schedules a reconnect after the configured delay.
    pub async fn run(&self, status: watch::Sender<ConnectionStatus>, mut shutdown: watch::Receiver<bool>) {
        loop {
            status.send_replace(ConnectionStatus::Connecting);
            let outcome = tokio::select! {
                outcome = self.session(&status) => outcome,
                _ = shutdown_requested(&mut shutdown) => break,
            };

            match outcome {
                Ok(CloseDisposition::Normal) => {
                    info!("WebSocket closed normally, not reconnecting");
                    break;
                }
                Ok(CloseDisposition::Reconnect) => {
                    status.send_replace(ConnectionStatus::Disconnected);
                    warn!("WebSocket closed abnormally, reconnecting in {:?}", self.reconnect_delay);
                }
                Err(e) => {
                    status.send_replace(ConnectionStatus::Error);
                    error!("WebSocket error: {e:#}, reconnecting in {:?}", self.reconnect_delay);
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.reconnect_delay) => {}
                _ = shutdown_requested(&mut shutdown) => break,
            }
        }
        status.send_replace(ConnectionStatus::Disconnected);
        info!("Realtime channel stopped");
    }

    async fn session(&self, status: &watch::Sender<ConnectionStatus>) -> Result<CloseDisposition> {
        info!("Connecting to WebSocket: {}", self.url);
        let (mut ws, _) = connect_async(self.url.as_str())
            .await
            .with_context(|| format!("Cannot connect to {}", self.url))?;

        let auth = serde_json::to_string(&self.auth)?;
        ws.send(Message::Text(auth))
            .await
            .context("Cannot send auth frame")?;
        status.send_replace(ConnectionStatus::Connected);
        info!("WebSocket connection established");

        while let Some(msg) = ws.next().await {
            match msg {
                Ok(Message::Text(text)) => handle_frame(&text),
                Ok(Message::Close(frame)) => {
                    let code = frame.as_ref().map(|f| u16::from(f.code));
                    let reason = frame.as_ref().map(|f| f.reason.to_string()).unwrap_or_default();
                    info!("WebSocket closed: code={code:?} reason={reason:?}");
                    return Ok(CloseDisposition::from_code(code));
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("WebSocket read failed: {e}");
                    return Ok(CloseDisposition::Reconnect);
                }
            }
        }
        Ok(CloseDisposition::Reconnect)
    }
}

fn handle_frame(text: &str) {
    debug!("WebSocket message received: {text}");
    match serde_json::from_str::<ServerMessage>(text) {
        Ok(msg) if msg.is_authenticated() => info!("WebSocket authentication successful"),
        Ok(msg) if msg.is_error() => {
            warn!("WebSocket server error: {}", msg.message.as_deref().unwrap_or("unknown"))
        }
        Ok(_) => {}
        Err(e) => warn!("WebSocket message parsing error: {e}"),
    }
}

/// Resolves once `true` is observed.  A dropped sender never resolves.
async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

// ─── tests ───────────────────────────────────────────────────────────────
