//! Event channel client
//!
//! Maintains one logical subscription to the bus, independent of transport
//! churn. Each (re)connect runs the full auth → connect → subscribe sequence
//! and then reads frames until the connection drops. Reconnects are retried
//! indefinitely with exponential backoff; the tracker keeps its sessions
//! across short drops and only hears about them as connection-state updates.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use informer_core::config::ConnectionConfig;
use informer_core::models::ChannelUpdate;
use informer_core::{AppError, AppResult};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::auth::authenticate;
use crate::event::{parse_frame, subscribe_frame, CALL_EVENT_CATEGORIES};

pub struct EventChannelClient {
    config: ConnectionConfig,
    http: reqwest::Client,
}

impl EventChannelClient {
    pub fn new(config: ConnectionConfig) -> AppResult<Self> {
        let http = reqwest::ClientBuilder::new()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Self { config, http })
    }

    /// Run the subscription loop until the update receiver goes away
    ///
    /// Never returns on connection failures; each attempt repeats the full
    /// auth → subscribe sequence. Auth failures are logged distinctly so an
    /// operator can tell bad credentials from a flaky network, but both keep
    /// retrying — this is a long-lived background service.
    pub async fn run(self, updates: mpsc::Sender<ChannelUpdate>) {
        let initial_delay = Duration::from_millis(self.config.reconnect_initial_delay_ms);
        let max_delay = Duration::from_millis(self.config.reconnect_max_delay_ms);
        let mut delay = initial_delay;
        let mut was_connected = false;

        loop {
            match self
                .connect_and_listen(&updates, &mut was_connected, &mut delay)
                .await
            {
                Ok(()) => info!("event channel closed by server"),
                Err(AppError::AuthFailed(reason)) => {
                    error!("authentication failed: {}; check credentials", reason)
                }
                Err(e) => warn!("event channel error: {}", e),
            }

            if was_connected {
                was_connected = false;
                if updates.send(ChannelUpdate::Disconnected).await.is_err() {
                    return;
                }
            }
            if updates.is_closed() {
                return;
            }

            debug!("reconnecting in {:?}", delay);
            sleep(delay).await;
            delay = (delay * 2).min(max_delay);
        }
    }

    async fn connect_and_listen(
        &self,
        updates: &mpsc::Sender<ChannelUpdate>,
        was_connected: &mut bool,
        delay: &mut Duration,
    ) -> AppResult<()> {
        let session = authenticate(&self.http, &self.config).await?;

        let (ws, _) = connect_async(self.config.event_url.as_str())
            .await
            .map_err(|e| AppError::Transport(format!("websocket connect failed: {}", e)))?;
        let (mut sink, mut stream) = ws.split();

        for category in CALL_EVENT_CATEGORIES {
            let frame = subscribe_frame(&session.auth_token, &session.account_id, category);
            sink.send(Message::Text(frame.into()))
                .await
                .map_err(|e| AppError::Transport(format!("subscribe failed: {}", e)))?;
        }

        info!(
            event_url = %self.config.event_url,
            categories = CALL_EVENT_CATEGORIES.len(),
            "subscribed to call events"
        );

        *was_connected = true;
        *delay = Duration::from_millis(self.config.reconnect_initial_delay_ms);
        if updates.send(ChannelUpdate::Reconnected).await.is_err() {
            return Ok(());
        }

        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => match parse_frame(text.as_str()) {
                    Ok(Some(event)) => {
                        if updates.send(ChannelUpdate::Event(event)).await.is_err() {
                            return Ok(());
                        }
                    }
                    Ok(None) => {}
                    Err(e) => debug!("dropping unparseable frame: {}", e),
                },
                Ok(Message::Ping(payload)) => {
                    // Split halves don't auto-pong; answer by hand
                    if sink.send(Message::Pong(payload)).await.is_err() {
                        return Err(AppError::Transport("pong send failed".to_string()));
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("server sent close frame");
                    break;
                }
                Ok(_) => {}
                Err(e) => return Err(AppError::Transport(format!("read failed: {}", e))),
            }
        }

        Ok(())
    }
}
