//! Client-side view of the chat: what a front-end keeps between frames.
//!
//! [`ChatSession`] consumes [`ServerMessage`]s and produces the [`ClientMessage`]s to
//! send. It holds no socket; the caller owns the transport and reports connection
//! changes.

mod timeline;
mod typing;

pub use timeline::Timeline;
pub use typing::{TypingBoard, TYPING_WINDOW};

use crate::protocol::{ClientMessage, ServerMessage};
use crate::types::ConnectionId;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Online,
    Offline,
}

#[derive(Debug, Default)]
pub struct ChatSession {
    connection_id: Option<ConnectionId>,
    username: Option<String>,
    timeline: Timeline,
    typing: TypingBoard,
    last_error: Option<String>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Status {
        if self.connection_id.is_some() {
            Status::Online
        } else {
            Status::Offline
        }
    }

    pub fn connection_id(&self) -> Option<&ConnectionId> {
        self.connection_id.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The transport dropped. Anything composed from now on is lost.
    pub fn on_disconnected(&mut self) {
        self.connection_id = None;
    }

    /// Pick a display name. Returns the join frame to send, if online.
    ///
    /// A name picked while offline is announced once the next welcome arrives.
    pub fn join(&mut self, name: &str) -> Option<ClientMessage> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.username = Some(name.to_string());
        self.online_then(ClientMessage::Join {
            name: name.to_string(),
        })
    }

    /// Compose a chat message at the current wall-clock time
    pub fn send(&mut self, text: &str) -> Option<ClientMessage> {
        self.send_at(text, chrono::Utc::now().timestamp_millis())
    }

    /// Compose a chat message. Nothing is sent or rendered while offline, before
    /// joining, or for blank text.
    pub fn send_at(&mut self, text: &str, time: i64) -> Option<ClientMessage> {
        if self.status() == Status::Offline {
            tracing::debug!("Dropping message composed while offline");
            return None;
        }
        let username = self.username.clone()?;
        self.timeline
            .compose(&username, text, time)
            .map(ClientMessage::ChatMessage)
    }

    /// Typing notice for the current user, if online and joined
    pub fn typing(&self) -> Option<ClientMessage> {
        let name = self.username.clone()?;
        self.online_then(ClientMessage::Typing { name })
    }

    /// Names of other users currently typing
    pub fn typing_names(&mut self) -> Vec<String> {
        self.typing_names_at(Instant::now())
    }

    pub fn typing_names_at(&mut self, now: Instant) -> Vec<String> {
        let own = self.username.clone();
        self.typing
            .active_at(now)
            .into_iter()
            .filter(|name| !name.is_empty() && Some(name) != own.as_ref())
            .collect()
    }

    /// Consume a server frame. Returns a frame to send back, if any.
    pub fn apply(&mut self, msg: ServerMessage) -> Option<ClientMessage> {
        self.apply_at(msg, Instant::now())
    }

    pub fn apply_at(&mut self, msg: ServerMessage, now: Instant) -> Option<ClientMessage> {
        match msg {
            ServerMessage::Welcome { connection_id, .. } => {
                self.connection_id = Some(connection_id);
                // The server forgets names across reconnects
                let name = self.username.clone()?;
                Some(ClientMessage::Join { name })
            }
            ServerMessage::ChatMessage(chat) => {
                self.timeline.receive(chat);
                None
            }
            ServerMessage::Typing { id, name } => {
                self.typing.note_at(id, name, now);
                None
            }
            ServerMessage::Error { code, msg } => {
                tracing::warn!(code = %code, "Server rejected a message: {}", msg);
                self.last_error = Some(msg);
                None
            }
        }
    }

    fn online_then(&self, msg: ClientMessage) -> Option<ClientMessage> {
        match self.status() {
            Status::Online => Some(msg),
            Status::Offline => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use std::time::Duration;

    fn online(id: &str) -> ChatSession {
        let mut session = ChatSession::new();
        session.apply(ServerMessage::Welcome {
            connection_id: id.to_string(),
            server_now: "2024-01-01T00:00:00Z".to_string(),
        });
        session
    }

    #[test]
    fn test_starts_offline() {
        let mut session = ChatSession::new();
        assert_eq!(session.status(), Status::Offline);
        assert!(session.join("Alice").is_none());
        assert_eq!(session.username(), Some("Alice"));
        assert!(session.send_at("hi", 1).is_none());
        assert!(session.timeline().is_empty());
    }

    #[test]
    fn test_offline_join_is_sent_on_welcome() {
        let mut session = ChatSession::new();
        assert!(session.join("Alice").is_none());

        let frame = session.apply(ServerMessage::Welcome {
            connection_id: "a".to_string(),
            server_now: "2024-01-01T00:00:00Z".to_string(),
        });
        assert_eq!(
            frame,
            Some(ClientMessage::Join {
                name: "Alice".to_string()
            })
        );
    }

    #[test]
    fn test_reconnect_rejoins_with_same_name() {
        let mut session = online("a");
        session.join("Alice");
        session.on_disconnected();

        let frame = session.apply(ServerMessage::Welcome {
            connection_id: "b".to_string(),
            server_now: "2024-01-01T00:00:00Z".to_string(),
        });
        assert!(matches!(frame, Some(ClientMessage::Join { name }) if name == "Alice"));
        assert_eq!(session.status(), Status::Online);
    }

    #[test]
    fn test_welcome_before_join_sends_nothing() {
        let mut session = ChatSession::new();
        let frame = session.apply(ServerMessage::Welcome {
            connection_id: "a".to_string(),
            server_now: "2024-01-01T00:00:00Z".to_string(),
        });
        assert!(frame.is_none());
    }

    #[test]
    fn test_own_message_rendered_once() {
        let mut session = online("a");
        session.join("Alice");

        let sent = match session.send_at("hi", 1000) {
            Some(ClientMessage::ChatMessage(chat)) => chat,
            other => panic!("Expected ChatMessage, got {:?}", other),
        };
        assert_eq!(session.timeline().len(), 1);

        session.apply(ServerMessage::ChatMessage(sent));
        assert_eq!(session.timeline().len(), 1);
    }

    #[test]
    fn test_send_before_join_is_ignored() {
        let mut session = online("a");
        assert!(session.send_at("hi", 1).is_none());
        assert!(session.typing().is_none());
    }

    #[test]
    fn test_messages_lost_after_disconnect() {
        let mut session = online("a");
        session.join("Alice");
        session.on_disconnected();

        assert_eq!(session.status(), Status::Offline);
        assert!(session.send_at("are you there?", 5).is_none());
        assert!(session.timeline().is_empty());
    }

    #[test]
    fn test_typing_names_exclude_self_and_expire() {
        let mut session = online("a");
        session.join("Alice");
        let now = Instant::now();

        session.apply_at(
            ServerMessage::Typing {
                id: "b".to_string(),
                name: "Bob".to_string(),
            },
            now,
        );
        session.apply_at(
            ServerMessage::Typing {
                id: "c".to_string(),
                name: "Alice".to_string(),
            },
            now,
        );

        assert_eq!(session.typing_names_at(now), vec!["Bob".to_string()]);
        assert!(session
            .typing_names_at(now + TYPING_WINDOW + Duration::from_millis(1))
            .is_empty());
    }

    #[test]
    fn test_error_frame_is_kept() {
        let mut session = online("a");
        session.apply(ServerMessage::Error {
            code: "TEXT_TOO_LONG".to_string(),
            msg: "too long".to_string(),
        });
        assert_eq!(session.last_error(), Some("too long"));
    }

    #[test]
    fn test_other_users_messages_are_appended() {
        let mut session = online("a");
        session.apply(ServerMessage::ChatMessage(
            ChatMessage::new("Bob", "yo", 1001).with_id("b1"),
        ));
        assert_eq!(session.timeline().messages()[0].username(), Some("Bob"));
    }
}
