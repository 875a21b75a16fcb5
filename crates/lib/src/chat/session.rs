//! Chat connection state machine and transcript.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use super::client::{ChatError, TimelineEvent};
use super::command::{self, NavCommand};
use super::retry::RetryPolicy;
use crate::i18n::Text;

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// `retry_at` is set while a rate-limit retry is scheduled.
    Failed {
        error: Text,
        retry_at: Option<Instant>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SendKind {
    Text,
    File,
    Voice,
}

impl SendKind {
    pub fn failure(self) -> Text {
        match self {
            SendKind::Text => Text::SendMessageFailed,
            SendKind::File => Text::UploadFileFailed,
            SendKind::Voice => Text::SendVoiceFailed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub event_id: String,
    pub sender: String,
    pub body: String,
    pub timestamp_ms: i64,
}

/// Outcome of ingesting one timeline event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingest {
    /// New entry. `command` is set only when navigation commands are enabled and the body
    /// parses as one.
    Appended { command: Option<NavCommand> },
    Duplicate,
}

/// Identifies one connect attempt; `disconnect` makes every earlier ticket stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectTicket {
    generation: u64,
}

pub struct ChatSession {
    state: ConnectionState,
    generation: u64,
    policy: RetryPolicy,
    attempts: u32,
    navigation_commands: bool,
    user_id: Option<String>,
    transcript: Vec<TranscriptEntry>,
    seen: HashSet<String>,
    pending: HashSet<SendKind>,
    send_error: Option<Text>,
}

impl ChatSession {
    pub fn new(policy: RetryPolicy, navigation_commands: bool) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            generation: 0,
            policy,
            attempts: 0,
            navigation_commands,
            user_id: None,
            transcript: Vec::new(),
            seen: HashSet::new(),
            pending: HashSet::new(),
            send_error: None,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_own(&self, entry: &TranscriptEntry) -> bool {
        self.user_id.as_deref() == Some(entry.sender.as_str())
    }

    /// Error to show above the transcript: a send failure, else the connection error.
    pub fn error(&self) -> Option<Text> {
        self.send_error.or(match self.state {
            ConnectionState::Failed { error, .. } => Some(error),
            _ => None,
        })
    }

    /// Start a connect attempt. None while one is in flight or already connected.
    pub fn begin_connect(&mut self) -> Option<ConnectTicket> {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => None,
            _ => {
                self.generation += 1;
                self.state = ConnectionState::Connecting;
                Some(ConnectTicket {
                    generation: self.generation,
                })
            }
        }
    }

    /// True when `ticket` belongs to the attempt still in flight.
    pub fn is_current(&self, ticket: &ConnectTicket) -> bool {
        ticket.generation == self.generation && self.state == ConnectionState::Connecting
    }

    /// Apply a successful connect. Returns false (and changes nothing) for a stale ticket;
    /// the caller must then stop the connection it produced.
    pub fn connect_succeeded(&mut self, ticket: &ConnectTicket, user_id: Option<String>) -> bool {
        if !self.is_current(ticket) {
            log::debug!("dropping stale chat connect {}", ticket.generation);
            return false;
        }
        log::info!("chat connected");
        self.state = ConnectionState::Connected;
        self.attempts = 0;
        self.user_id = user_id;
        self.send_error = None;
        true
    }

    /// Record a failed connect. Returns the delay of a scheduled retry, if any; only
    /// rate limiting is retried, and only within the policy. Stale tickets are ignored.
    pub fn connect_failed(
        &mut self,
        ticket: &ConnectTicket,
        err: &ChatError,
        now: Instant,
    ) -> Option<Duration> {
        if !self.is_current(ticket) {
            log::debug!("dropping stale chat connect failure: {}", err);
            return None;
        }
        log::warn!("chat connect failed: {}", err);
        let delay = match err {
            ChatError::RateLimited { retry_after } => {
                self.attempts += 1;
                self.policy.delay_for(self.attempts, *retry_after)
            }
            _ => None,
        };
        match delay {
            Some(d) => {
                log::info!("chat connect retry {} in {:?}", self.attempts, d);
                self.state = ConnectionState::Failed {
                    error: Text::ChatConnectFailed,
                    retry_at: Some(now + d),
                };
            }
            None => {
                self.state = ConnectionState::Failed {
                    error: Text::ChatConnectFailed,
                    retry_at: None,
                };
            }
        }
        delay
    }

    /// True once a scheduled retry is due.
    pub fn retry_due(&self, now: Instant) -> bool {
        matches!(self.state, ConnectionState::Failed { retry_at: Some(at), .. } if at <= now)
    }

    /// Append `event` unless its identifier was seen before.
    pub fn ingest(&mut self, event: TimelineEvent) -> Ingest {
        if !self.seen.insert(event.event_id.clone()) {
            return Ingest::Duplicate;
        }
        let command = if self.navigation_commands {
            command::parse(&event.body)
        } else {
            None
        };
        if let Some(cmd) = &command {
            log::info!("navigation command from {}: {:?}", event.sender, cmd);
        }
        self.transcript.push(TranscriptEntry {
            event_id: event.event_id,
            sender: event.sender,
            body: event.body,
            timestamp_ms: event.timestamp_ms,
        });
        Ingest::Appended { command }
    }

    /// Trimmed text to send, or None when blank or not connected.
    pub fn prepare_text(&self, input: &str) -> Option<String> {
        let body = input.trim();
        if body.is_empty() || !self.is_connected() {
            return None;
        }
        Some(body.to_string())
    }

    /// Mark a send of `kind` in flight. Refused when disconnected or the same kind is pending.
    pub fn begin_send(&mut self, kind: SendKind) -> bool {
        if !self.is_connected() || self.pending.contains(&kind) {
            return false;
        }
        self.pending.insert(kind);
        true
    }

    pub fn is_sending(&self, kind: SendKind) -> bool {
        self.pending.contains(&kind)
    }

    pub fn send_succeeded(&mut self, kind: SendKind) {
        self.pending.remove(&kind);
        self.send_error = None;
    }

    pub fn send_failed(&mut self, kind: SendKind) {
        self.pending.remove(&kind);
        self.send_error = Some(kind.failure());
    }

    pub fn clear_error(&mut self) {
        self.send_error = None;
    }

    /// Back to disconnected; the transcript and seen-set are kept. A connect still in
    /// flight becomes stale.
    pub fn disconnect(&mut self) {
        self.generation += 1;
        self.state = ConnectionState::Disconnected;
        self.attempts = 0;
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, body: &str) -> TimelineEvent {
        TimelineEvent {
            event_id: id.to_string(),
            sender: "@bob:example.org".to_string(),
            body: body.to_string(),
            timestamp_ms: 1,
        }
    }

    fn connected(navigation: bool) -> ChatSession {
        let mut session = ChatSession::new(RetryPolicy::default(), navigation);
        let ticket = session.begin_connect().unwrap();
        assert!(session.connect_succeeded(&ticket, Some("@admin:example.org".to_string())));
        session
    }

    #[test]
    fn duplicate_events_produce_one_entry() {
        let mut session = connected(false);
        assert_eq!(
            session.ingest(event("$1", "hi")),
            Ingest::Appended { command: None }
        );
        assert_eq!(session.ingest(event("$1", "hi")), Ingest::Duplicate);
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn commands_only_when_enabled() {
        let mut off = connected(false);
        assert_eq!(
            off.ingest(event("$1", "go to resident R1")),
            Ingest::Appended { command: None }
        );
        let mut on = connected(true);
        match on.ingest(event("$1", "go to resident R1")) {
            Ingest::Appended { command: Some(cmd) } => {
                assert_eq!(cmd.id.as_deref(), Some("R1"))
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            on.ingest(event("$2", "hello there")),
            Ingest::Appended { command: None }
        );
    }

    #[test]
    fn rate_limit_schedules_capped_retries() {
        let policy = RetryPolicy {
            max_retries: 2,
            ..RetryPolicy::default()
        };
        let mut session = ChatSession::new(policy, false);
        let now = Instant::now();
        let limited = ChatError::RateLimited {
            retry_after: Some(Duration::from_secs(1)),
        };

        let first = session.begin_connect().unwrap();
        assert!(session.begin_connect().is_none());
        assert_eq!(
            session.connect_failed(&first, &limited, now),
            Some(Duration::from_secs(1))
        );
        assert!(!session.retry_due(now));
        assert!(session.retry_due(now + Duration::from_secs(1)));

        let second = session.begin_connect().unwrap();
        assert_eq!(
            session.connect_failed(&second, &limited, now),
            Some(Duration::from_secs(2))
        );
        let third = session.begin_connect().unwrap();
        assert_eq!(session.connect_failed(&third, &limited, now), None);
        assert!(!session.retry_due(now + Duration::from_secs(3600)));
        assert_eq!(session.error(), Some(Text::ChatConnectFailed));
    }

    #[test]
    fn other_failures_are_not_retried() {
        let mut session = ChatSession::new(RetryPolicy::default(), false);
        let ticket = session.begin_connect().unwrap();
        let delay = session.connect_failed(
            &ticket,
            &ChatError::Other("bad password".into()),
            Instant::now(),
        );
        assert_eq!(delay, None);
        assert!(matches!(
            session.state(),
            ConnectionState::Failed { retry_at: None, .. }
        ));
    }

    #[test]
    fn connect_finishing_after_disconnect_is_dropped() {
        let mut session = ChatSession::new(RetryPolicy::default(), false);
        let late = session.begin_connect().unwrap();
        session.disconnect();
        assert!(!session.connect_succeeded(&late, Some("@admin:example.org".to_string())));
        assert!(!session.is_connected());
        assert_eq!(session.state(), &ConnectionState::Disconnected);
        assert_eq!(session.user_id(), None);

        let fresh = session.begin_connect().unwrap();
        assert!(!session.connect_succeeded(&late, None));
        assert!(session.is_current(&fresh));
        assert!(session.connect_succeeded(&fresh, None));
        assert!(session.is_connected());
    }

    #[test]
    fn stale_failure_does_not_schedule_retry() {
        let mut session = ChatSession::new(RetryPolicy::default(), false);
        let late = session.begin_connect().unwrap();
        session.disconnect();
        let limited = ChatError::RateLimited { retry_after: None };
        assert_eq!(session.connect_failed(&late, &limited, Instant::now()), None);
        assert_eq!(session.state(), &ConnectionState::Disconnected);
        assert_eq!(session.error(), None);
    }

    #[test]
    fn sends_require_connection_and_are_independent() {
        let mut idle = ChatSession::new(RetryPolicy::default(), false);
        assert!(!idle.begin_send(SendKind::Text));
        assert_eq!(idle.prepare_text("hello"), None);

        let mut session = connected(false);
        assert_eq!(session.prepare_text("  hello \n"), Some("hello".to_string()));
        assert_eq!(session.prepare_text("   "), None);
        assert!(session.begin_send(SendKind::Text));
        assert!(!session.begin_send(SendKind::Text));
        assert!(session.begin_send(SendKind::Voice));
        session.send_failed(SendKind::Voice);
        assert_eq!(session.error(), Some(Text::SendVoiceFailed));
        assert!(session.is_sending(SendKind::Text));
        session.send_succeeded(SendKind::Text);
        assert_eq!(session.error(), None);
    }

    #[test]
    fn own_messages_are_recognised() {
        let mut session = connected(false);
        let mut ev = event("$1", "hi");
        ev.sender = "@admin:example.org".to_string();
        session.ingest(ev);
        assert!(session.is_own(&session.transcript()[0]));
    }
}
