use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque ID types for type safety
pub type ConnectionId = String;
pub type MessageId = String;

/// Lifecycle of a single connection as seen by the registry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    /// Transport is open, no display name yet
    Connected,
    /// The client announced a display name via `join`
    Identified,
    /// Terminal, no further events are accepted
    Closed,
}

/// A chat message as it travels over the wire.
///
/// Every field is client-supplied and the relay re-emits the object as it came in:
/// unknown fields stay, absent fields stay absent and values keep their JSON type.
/// The accessors only read the well-known fields `id`, `username`, `text` and `time`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ChatMessage {
    fields: Map<String, Value>,
}

impl ChatMessage {
    pub fn new(username: impl Into<String>, text: impl Into<String>, time: i64) -> Self {
        Self::default()
            .with_field("username", Value::String(username.into()))
            .with_field("text", Value::String(text.into()))
            .with_field("time", time)
    }

    pub fn with_id(self, id: impl Into<MessageId>) -> Self {
        self.with_field("id", Value::String(id.into()))
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Client-generated id used by consumers to drop the echo of their own message
    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }

    pub fn username(&self) -> Option<&str> {
        self.fields.get("username").and_then(Value::as_str)
    }

    /// True when `username` is absent, null or an empty string
    pub fn lacks_username(&self) -> bool {
        match self.fields.get("username") {
            None | Some(Value::Null) => true,
            Some(Value::String(name)) => name.is_empty(),
            Some(_) => false,
        }
    }

    pub fn set_username(&mut self, username: String) {
        self.fields
            .insert("username".to_string(), Value::String(username));
    }

    pub fn text(&self) -> Option<&str> {
        self.fields.get("text").and_then(Value::as_str)
    }

    /// Client wall-clock time in milliseconds, if it is an integer
    pub fn time(&self) -> Option<i64> {
        self.fields.get("time").and_then(Value::as_i64)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}
