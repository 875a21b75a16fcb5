//! Transport seam of the chat panel.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// A message seen in the room timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEvent {
    pub event_id: String,
    pub sender: String,
    pub body: String,
    pub timestamp_ms: i64,
}

/// File or voice note to send.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub mime: String,
    pub data: Vec<u8>,
}

impl Upload {
    /// Read `path` from disk; the mime type is guessed from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, ChatError> {
        let data = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self {
            mime: mime_guess::from_path(path).first_or_octet_stream().to_string(),
            filename,
            data,
        })
    }

    pub fn is_audio(&self) -> bool {
        self.mime.starts_with("audio/")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("rate limited by homeserver")]
    RateLimited { retry_after: Option<Duration> },
    #[error("chat not connected")]
    NotConnected,
    #[error("chat io: {0}")]
    Io(#[from] std::io::Error),
    #[error("chat error: {0}")]
    Other(String),
}

/// Connection to the chat room. Implementations own their sync task.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Log in, join the room and start forwarding timeline messages to `events`.
    async fn connect(&self, events: UnboundedSender<TimelineEvent>) -> Result<(), ChatError>;
    /// Own user id once connected, used to tell own messages apart.
    fn user_id(&self) -> Option<String>;
    async fn send_text(&self, body: &str) -> Result<(), ChatError>;
    async fn send_file(&self, upload: Upload) -> Result<(), ChatError>;
    /// Send an audio upload as a voice note.
    async fn send_voice(&self, upload: Upload) -> Result<(), ChatError>;
    /// Stop syncing. Safe to call more than once.
    fn stop(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn upload_of(name: &str) -> Upload {
        let dir = std::env::temp_dir().join(format!("bihua-upload-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, b"data").unwrap();
        let upload = Upload::from_path(&path).await.unwrap();
        let _ = std::fs::remove_dir_all(dir);
        upload
    }

    #[tokio::test]
    async fn mime_is_guessed_from_extension() {
        let voice = upload_of("note.MP3").await;
        assert_eq!(voice.filename, "note.MP3");
        assert_eq!(voice.mime, "audio/mpeg");
        assert!(voice.is_audio());
        assert_eq!(upload_of("clip.flac").await.mime, "audio/flac");
        assert!(!upload_of("clip.mp4").await.is_audio());
        assert_eq!(upload_of("report.pdf").await.mime, "application/pdf");
        assert_eq!(upload_of("noext").await.mime, "application/octet-stream");
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = Upload::from_path(Path::new("/definitely/not/here.ogg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Io(_)));
    }
}
