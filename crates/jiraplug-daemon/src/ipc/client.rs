//! Persistent connection to the orchestration server
//!
//! The plug logs in and registers on every (re)connection, then answers each
//! inbound text frame from its own task. Responses are written back as they
//! complete, so they may leave out of request order.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::protocol::{PlugMessage, ResponseEnvelope};
use crate::api::ApiHandler;

pub const ISSUE_TRACKER_PLUG_TYPE: &str = "issueTrackerPlug";

#[derive(Debug, thiserror::Error)]
pub enum PlugClientError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Connection closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, PlugClientError>;

#[derive(Debug, Clone)]
pub struct PlugConfig {
    /// Orchestration server web socket URL
    pub server_url: String,
    pub plug_type: String,
    pub name: String,
    pub api_key: String,
    pub reconnect_delay: Duration,
    /// Keepalive ping interval
    pub ping_interval: Duration,
}

impl PlugConfig {
    pub fn new(
        server_url: impl Into<String>,
        name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            plug_type: ISSUE_TRACKER_PLUG_TYPE.to_string(),
            name: name.into(),
            api_key: api_key.into(),
            reconnect_delay: Duration::from_secs(5),
            ping_interval: Duration::from_secs(30),
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

pub struct PlugClient {
    config: PlugConfig,
    api_handler: Arc<ApiHandler>,
    shutdown_tx: watch::Sender<bool>,
}

impl PlugClient {
    pub fn new(config: PlugConfig, api_handler: Arc<ApiHandler>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config,
            api_handler,
            shutdown_tx,
        }
    }

    /// Stop `run`, closing the current connection if any.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Keep the connection alive until shutdown, reconnecting after every
    /// failure or server-side close.
    pub async fn run(&self) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut attempts = 0u32;

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            tracing::info!("Connecting to {}", self.config.server_url);

            match self.connect_and_serve().await {
                Ok(true) => break,
                Ok(false) => {
                    tracing::info!("Server closed the connection");
                    attempts = 0;
                }
                Err(e) => {
                    attempts += 1;
                    tracing::error!("Connection error: {}", e);
                }
            }

            tracing::info!(
                "Reconnecting in {:?} (attempt {})",
                self.config.reconnect_delay,
                attempts + 1
            );

            tokio::select! {
                _ = tokio::time::sleep(self.config.reconnect_delay) => {}
                _ = shutdown_rx.changed() => {}
            }
        }

        tracing::info!("Plug client stopped");
    }

    /// Serve one connection. `Ok(true)` means shutdown was requested.
    async fn connect_and_serve(&self) -> Result<bool> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let (ws_stream, _) = connect_async(self.config.server_url.as_str()).await?;
        let (mut write, mut read) = ws_stream.split();

        for message in [
            PlugMessage::login(self.config.api_key.clone()),
            PlugMessage::register(self.config.plug_type.clone(), self.config.name.clone()),
        ] {
            write
                .send(Message::Text(serde_json::to_string(&message)?))
                .await?;
        }
        tracing::info!(
            "Registered as {} [{}]",
            self.config.plug_type,
            self.config.name
        );

        let (response_tx, mut response_rx) = mpsc::unbounded_channel::<ResponseEnvelope>();
        let mut ping_interval = tokio::time::interval(self.config.ping_interval);
        ping_interval.tick().await;

        if *shutdown_rx.borrow_and_update() {
            return Ok(true);
        }

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    tracing::info!("Shutdown requested, closing connection");
                    if let Err(e) = write.close().await {
                        tracing::debug!("Close failed: {}", e);
                    }
                    return Ok(true);
                }

                _ = ping_interval.tick() => {
                    write.send(Message::Ping(Vec::new())).await?;
                }

                Some(response) = response_rx.recv() => {
                    let json = response.to_json()?;
                    write.send(Message::Text(json)).await?;
                    tracing::debug!("Response sent for request [{}]", response.request_id);
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.spawn_request(text, response_tx.clone());
                        }
                        Some(Ok(Message::Close(_))) => return Ok(false),
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                        None => return Err(PlugClientError::Closed),
                    }
                }
            }
        }
    }

    fn spawn_request(&self, text: String, response_tx: mpsc::UnboundedSender<ResponseEnvelope>) {
        let handler = self.api_handler.clone();
        tokio::spawn(async move {
            let response = handler.process(&text).await;
            if response_tx.send(response).is_err() {
                tracing::warn!("Connection lost before the response could be sent");
            }
        });
    }
}
