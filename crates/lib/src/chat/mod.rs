//! Chat panel mirroring one room of the messaging platform.
//!
//! The transport sits behind [`ChatClient`]; [`ChatSession`] owns connection state, the
//! deduplicated transcript and send errors, and is driven from the UI thread.

mod client;
pub mod command;
#[cfg(feature = "matrix")]
pub mod matrix;
mod retry;
mod session;

pub use client::{ChatClient, ChatError, TimelineEvent, Upload};
pub use command::NavCommand;
pub use retry::RetryPolicy;
pub use session::{ChatSession, ConnectTicket, ConnectionState, Ingest, SendKind, TranscriptEntry};

use std::sync::Arc;

use crate::config::Config;

/// Chat client for `config`, or None when Matrix support is not compiled in or the
/// homeserver, user, room or password is missing.
pub fn client_from_config(config: &Config) -> Option<Arc<dyn ChatClient>> {
    #[cfg(feature = "matrix")]
    {
        matrix::MatrixChatClient::from_config(config).map(|c| Arc::new(c) as Arc<dyn ChatClient>)
    }
    #[cfg(not(feature = "matrix"))]
    {
        let _ = config;
        None
    }
}
