use super::registry::Registry;
use crate::config::PayloadLimits;
use crate::protocol::ServerMessage;
use crate::types::*;
use serde_json::Value;
use std::borrow::Cow;

/// Errors raised when a client payload breaks the configured bounds
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("Message text is {len} characters, limit is {max}")]
    TextTooLong { len: usize, max: usize },

    #[error("Name is {len} characters, limit is {max}")]
    NameTooLong { len: usize, max: usize },
}

impl RelayError {
    /// Stable code sent to the client in an error frame
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::TextTooLong { .. } => "TEXT_TOO_LONG",
            RelayError::NameTooLong { .. } => "NAME_TOO_LONG",
        }
    }
}

impl From<RelayError> for ServerMessage {
    fn from(err: RelayError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }
}

/// Fans chat messages and typing notices out to the connections in a [`Registry`]
#[derive(Debug, Clone)]
pub struct Relay {
    registry: Registry,
    limits: PayloadLimits,
}

impl Relay {
    pub fn new(registry: Registry, limits: PayloadLimits) -> Self {
        Self { registry, limits }
    }

    pub fn limits(&self) -> PayloadLimits {
        self.limits
    }

    /// Check a display name against the name bound
    pub fn check_name(&self, name: &str) -> Result<(), RelayError> {
        check_len(name, self.limits.max_name_chars)
            .map_err(|(len, max)| RelayError::NameTooLong { len, max })
    }

    /// Check a chat message against the text and name bounds.
    ///
    /// Non-string values are measured by their JSON encoding.
    pub fn check_message(&self, msg: &ChatMessage) -> Result<(), RelayError> {
        if let Some(text) = msg.get("text") {
            check_len(&value_text(text), self.limits.max_text_chars)
                .map_err(|(len, max)| RelayError::TextTooLong { len, max })?;
        }
        if let Some(username) = msg.get("username") {
            check_len(&value_text(username), self.limits.max_name_chars)
                .map_err(|(len, max)| RelayError::NameTooLong { len, max })?;
        }
        Ok(())
    }

    /// Deliver a chat message to every active connection, the sender included.
    ///
    /// The payload goes out unchanged, except that a missing, null or empty
    /// `username` is filled from the sender's join. Returns how many recipients accepted it. With nobody connected the message is
    /// dropped and 0 is returned.
    pub async fn on_chat_message(
        &self,
        sender: &ConnectionId,
        mut msg: ChatMessage,
    ) -> Result<usize, RelayError> {
        self.check_message(&msg)?;

        if msg.lacks_username() {
            if let Some(name) = self.registry.display_name(sender).await {
                msg.set_username(name);
            }
        }

        let delivered = self.fan_out(ServerMessage::ChatMessage(msg), None).await;
        tracing::debug!(connection_id = %sender, delivered, "Relayed chat message");
        Ok(delivered)
    }

    /// Tell every other connection that `sender` is typing
    pub async fn on_typing(
        &self,
        sender: &ConnectionId,
        name: String,
    ) -> Result<usize, RelayError> {
        self.check_name(&name)?;

        let notice = ServerMessage::Typing {
            id: sender.clone(),
            name,
        };
        Ok(self.fan_out(notice, Some(sender)).await)
    }

    /// Send to a snapshot of the registry. Each send is independent; a closed
    /// recipient is skipped without affecting the rest.
    async fn fan_out(&self, msg: ServerMessage, except: Option<&ConnectionId>) -> usize {
        let recipients = self.registry.snapshot(except).await;

        let mut delivered = 0;
        for recipient in recipients {
            match recipient.outbox.send(msg.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    tracing::debug!(
                        connection_id = %recipient.id,
                        "Dropped message for closed connection"
                    );
                }
            }
        }
        delivered
    }
}

fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// Ok if `value` fits in `max` chars (0 means unbounded), otherwise (len, max)
fn check_len(value: &str, max: usize) -> Result<(), (usize, usize)> {
    if max == 0 {
        return Ok(());
    }
    let len = value.chars().count();
    if len > max {
        Err((len, max))
    } else {
        Ok(())
    }
}
