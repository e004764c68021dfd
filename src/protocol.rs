use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "kebab-case")]
pub enum ClientMessage {
    Join { name: String },
    ChatMessage(ChatMessage),
    Typing { name: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Sent once, right after the upgrade completes
    Welcome {
        connection_id: ConnectionId,
        server_now: String,
    },
    ChatMessage(ChatMessage),
    Typing {
        id: ConnectionId,
        name: String,
    },
    /// Only ever sent to the connection that caused it
    Error {
        code: String,
        msg: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_message_wire_shape() {
        let msg = ServerMessage::ChatMessage(ChatMessage::new("Alice", "hi", 1000));
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({"t": "chat-message", "username": "Alice", "text": "hi", "time": 1000})
        );
    }

    #[test]
    fn test_chat_message_without_username_parses() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"chat-message","text":"hi","time":1000}"#).unwrap();
        match msg {
            ClientMessage::ChatMessage(chat) => {
                assert!(chat.lacks_username());
                assert_eq!(chat.text(), Some("hi"));
                assert_eq!(chat.time(), Some(1000));
                assert!(chat.id().is_none());
            }
            other => panic!("Expected ChatMessage, got {:?}", other),
        }
    }

    #[test]
    fn test_chat_payload_survives_parse_and_reserialize() {
        let frames = [
            json!({"t": "chat-message", "username": "A", "text": "hi", "time": 1000, "color": "red"}),
            json!({"t": "chat-message", "text": "hi"}),
            json!({"t": "chat-message", "username": null, "text": "hi", "time": 1000.5}),
            json!({"t": "chat-message", "id": "01J0", "meta": {"reply_to": [1, 2]}}),
        ];

        for frame in frames {
            let client: ClientMessage = serde_json::from_value(frame.clone()).unwrap();
            let chat = match client {
                ClientMessage::ChatMessage(chat) => chat,
                other => panic!("Expected ChatMessage, got {:?}", other),
            };
            let out = serde_json::to_value(ServerMessage::ChatMessage(chat)).unwrap();
            assert_eq!(out, frame);
        }
    }

    #[test]
    fn test_typing_notice_carries_connection_id() {
        let msg = ServerMessage::Typing {
            id: "conn-1".to_string(),
            name: "Alice".to_string(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"t": "typing", "id": "conn-1", "name": "Alice"}));
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let result = serde_json::from_str::<ClientMessage>(r#"{"t":"leave"}"#);
        assert!(result.is_err());
    }
}
