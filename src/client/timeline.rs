use crate::types::{ChatMessage, MessageId};
use std::collections::HashSet;

/// Ordered list of messages a client has rendered.
///
/// Own messages are shown as soon as they are sent and carry a fresh id; the relay
/// echo with the same id is then ignored.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    messages: Vec<ChatMessage>,
    seen: HashSet<MessageId>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an outgoing message and render it right away.
    ///
    /// Returns None for text that is empty after trimming.
    pub fn compose(&mut self, username: &str, text: &str, time: i64) -> Option<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let msg = ChatMessage::new(username, text, time).with_id(ulid::Ulid::new().to_string());
        self.insert(msg.clone());
        Some(msg)
    }

    /// Add a message that arrived from the relay. Returns false for a duplicate.
    ///
    /// Messages without an id cannot be matched and are always added.
    pub fn receive(&mut self, msg: ChatMessage) -> bool {
        if let Some(id) = msg.id() {
            if self.seen.contains(id) {
                return false;
            }
        }
        self.insert(msg);
        true
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn insert(&mut self, msg: ChatMessage) {
        if let Some(id) = msg.id() {
            self.seen.insert(id.to_string());
        }
        self.messages.push(msg);
    }
}
