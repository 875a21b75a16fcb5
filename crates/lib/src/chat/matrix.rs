//! [`ChatClient`] over the Matrix adapter crate.

use async_trait::async_trait;
use matrix_channel::{MatrixChannel, MatrixError, MatrixSettings, RoomMessage};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;

use super::client::{ChatClient, ChatError, TimelineEvent, Upload};
use crate::config::{resolve_matrix_password, resolve_matrix_user_id, Config};

const DEVICE_NAME: &str = "Bihua admin console";

impl From<MatrixError> for ChatError {
    fn from(err: MatrixError) -> Self {
        match err {
            MatrixError::RateLimited { retry_after } => ChatError::RateLimited { retry_after },
            other => ChatError::Other(other.to_string()),
        }
    }
}

impl From<RoomMessage> for TimelineEvent {
    fn from(msg: RoomMessage) -> Self {
        Self {
            event_id: msg.event_id,
            sender: msg.sender,
            body: msg.body,
            timestamp_ms: msg.timestamp_ms,
        }
    }
}

pub struct MatrixChatClient {
    settings: MatrixSettings,
    channel: Mutex<Option<Arc<MatrixChannel>>>,
}

impl MatrixChatClient {
    pub fn new(settings: MatrixSettings) -> Self {
        Self {
            settings,
            channel: Mutex::new(None),
        }
    }

    /// Client for the configured homeserver, user and room. None when any of them or the
    /// password is missing.
    pub fn from_config(config: &Config) -> Option<Self> {
        let m = &config.matrix;
        let settings = MatrixSettings {
            homeserver_url: m.homeserver_url.clone()?,
            user_id: resolve_matrix_user_id(config)?,
            password: resolve_matrix_password(config)?,
            room_id: m.default_room_id.clone()?,
            device_name: DEVICE_NAME.to_string(),
            via_servers: m.known_servers.clone(),
        };
        Some(Self::new(settings))
    }

    fn channel(&self) -> Result<Arc<MatrixChannel>, ChatError> {
        self.channel
            .lock()
            .map_err(|_| ChatError::Other("chat state poisoned".to_string()))?
            .clone()
            .ok_or(ChatError::NotConnected)
    }
}

#[async_trait]
impl ChatClient for MatrixChatClient {
    async fn connect(&self, events: UnboundedSender<TimelineEvent>) -> Result<(), ChatError> {
        let channel = Arc::new(MatrixChannel::login(&self.settings).await?);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<RoomMessage>();
        channel.start_sync(tx);
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if events.send(msg.into()).is_err() {
                    break;
                }
            }
        });
        let previous = self
            .channel
            .lock()
            .map_err(|_| ChatError::Other("chat state poisoned".to_string()))?
            .replace(channel);
        if let Some(previous) = previous {
            previous.stop();
        }
        Ok(())
    }

    fn user_id(&self) -> Option<String> {
        self.channel().ok().and_then(|c| c.user_id())
    }

    async fn send_text(&self, body: &str) -> Result<(), ChatError> {
        self.channel()?.send_text(body).await?;
        Ok(())
    }

    async fn send_file(&self, upload: Upload) -> Result<(), ChatError> {
        self.channel()?
            .send_attachment(&upload.filename, &upload.mime, upload.data)
            .await?;
        Ok(())
    }

    async fn send_voice(&self, upload: Upload) -> Result<(), ChatError> {
        if !upload.is_audio() {
            return Err(ChatError::Other(format!(
                "{} is not an audio file ({})",
                upload.filename, upload.mime
            )));
        }
        self.send_file(upload).await
    }

    fn stop(&self) {
        if let Ok(mut slot) = self.channel.lock() {
            if let Some(channel) = slot.take() {
                channel.stop();
            }
        }
    }
}
