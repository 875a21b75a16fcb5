//! Matrix room connector (matrix-sdk).
//!
//! Logs in with a password, resolves (or joins) one room, forwards that room's messages
//! over a channel and sends text and attachments to it.

use matrix_sdk::attachment::AttachmentConfig;
use matrix_sdk::config::SyncSettings;
use matrix_sdk::ruma::api::client::error::{ErrorKind, RetryAfter};
use matrix_sdk::ruma::events::room::message::{
    OriginalSyncRoomMessageEvent, RoomMessageEventContent,
};
use matrix_sdk::ruma::{OwnedRoomId, OwnedServerName, RoomId, RoomOrAliasId};
use matrix_sdk::{Client, Room};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Login and room settings.
#[derive(Debug, Clone)]
pub struct MatrixSettings {
    pub homeserver_url: String,
    pub user_id: String,
    pub password: String,
    pub room_id: String,
    /// Shown on the session list of the account.
    pub device_name: String,
    /// Servers to join through when the account is not in the room yet.
    pub via_servers: Vec<String>,
}

/// A message from the configured room.
#[derive(Debug, Clone)]
pub struct RoomMessage {
    pub event_id: String,
    pub sender: String,
    pub body: String,
    pub timestamp_ms: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    #[error("matrix rate limited")]
    RateLimited { retry_after: Option<Duration> },
    #[error("matrix client build failed: {0}")]
    Build(#[from] matrix_sdk::ClientBuildError),
    #[error("invalid room id: {0}")]
    RoomId(String),
    #[error("room {0} not available")]
    RoomUnavailable(String),
    #[error("matrix error: {0}")]
    Sdk(matrix_sdk::Error),
}

impl From<matrix_sdk::Error> for MatrixError {
    fn from(err: matrix_sdk::Error) -> Self {
        if let Some(ErrorKind::LimitExceeded { retry_after, .. }) = err.client_api_error_kind() {
            let retry_after = retry_after.as_ref().map(|r| match r {
                RetryAfter::Delay(d) => *d,
                RetryAfter::DateTime(at) => at
                    .duration_since(SystemTime::now())
                    .unwrap_or_default(),
            });
            return MatrixError::RateLimited { retry_after };
        }
        MatrixError::Sdk(err)
    }
}

/// Logged-in client bound to one room.
pub struct MatrixChannel {
    client: Client,
    room: Room,
    sync_task: Mutex<Option<JoinHandle<()>>>,
}

impl MatrixChannel {
    /// Password login, then resolve the room (joining it when not yet a member).
    pub async fn login(settings: &MatrixSettings) -> Result<Self, MatrixError> {
        let room_id: OwnedRoomId = RoomId::parse(settings.room_id.as_str())
            .map_err(|e| MatrixError::RoomId(format!("{}: {}", settings.room_id, e)))?;

        let client = Client::builder()
            .homeserver_url(&settings.homeserver_url)
            .build()
            .await?;
        client
            .matrix_auth()
            .login_username(settings.user_id.as_str(), &settings.password)
            .initial_device_display_name(&settings.device_name)
            .await?;
        log::info!("matrix logged in as {}", settings.user_id);

        client.sync_once(SyncSettings::default()).await?;
        let room = match client.get_room(&room_id) {
            Some(room) => room,
            None => {
                log::info!("joining matrix room {}", room_id);
                let via: Vec<OwnedServerName> = settings
                    .via_servers
                    .iter()
                    .filter_map(|s| match OwnedServerName::try_from(s.as_str()) {
                        Ok(name) => Some(name),
                        Err(e) => {
                            log::warn!("ignoring known server {}: {}", s, e);
                            None
                        }
                    })
                    .collect();
                let target: &RoomOrAliasId = (&*room_id).into();
                client.join_room_by_id_or_alias(target, &via).await?
            }
        };

        Ok(Self {
            client,
            room,
            sync_task: Mutex::new(None),
        })
    }

    pub fn user_id(&self) -> Option<String> {
        self.client.user_id().map(|u| u.to_string())
    }

    /// Forward messages of the configured room to `sender` and start the sync loop.
    pub fn start_sync(&self, sender: UnboundedSender<RoomMessage>) {
        let room_id = self.room.room_id().to_owned();
        self.client.add_event_handler(
            move |ev: OriginalSyncRoomMessageEvent, room: Room| {
                let sender = sender.clone();
                let room_id = room_id.clone();
                async move {
                    if room.room_id() != &*room_id {
                        return;
                    }
                    let msg = RoomMessage {
                        event_id: ev.event_id.to_string(),
                        sender: ev.sender.to_string(),
                        body: ev.content.body().to_string(),
                        timestamp_ms: u64::from(ev.origin_server_ts.0) as i64,
                    };
                    if sender.send(msg).is_err() {
                        log::debug!("matrix message receiver dropped");
                    }
                }
            },
        );

        let client = self.client.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = client.sync(SyncSettings::default()).await {
                log::warn!("matrix sync stopped: {}", e);
            }
        });
        if let Ok(mut slot) = self.sync_task.lock() {
            if let Some(old) = slot.replace(handle) {
                old.abort();
            }
        }
    }

    pub async fn send_text(&self, body: &str) -> Result<(), MatrixError> {
        self.room
            .send(RoomMessageEventContent::text_plain(body))
            .await?;
        Ok(())
    }

    /// Upload `data` and post it to the room. Audio mime types are posted as `m.audio`.
    pub async fn send_attachment(
        &self,
        filename: &str,
        mime: &str,
        data: Vec<u8>,
    ) -> Result<(), MatrixError> {
        let content_type: mime::Mime = mime.parse().unwrap_or(mime::APPLICATION_OCTET_STREAM);
        self.room
            .send_attachment(filename, &content_type, data, AttachmentConfig::new())
            .await?;
        Ok(())
    }

    /// Abort the sync loop.
    pub fn stop(&self) {
        if let Ok(mut slot) = self.sync_task.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
                log::info!("matrix sync stopped");
            }
        }
    }
}

impl Drop for MatrixChannel {
    fn drop(&mut self) {
        self.stop();
    }
}
