//! WebSocket message dispatch
//!
//! Each inbound frame is handled to completion before the next one from the same
//! connection is read. The returned message, if any, goes back to the sender only.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use crate::types::{ChatMessage, ConnectionId};
use std::sync::Arc;

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    connection_id: &ConnectionId,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::Join { name } => handle_join(state, connection_id, name).await,
        ClientMessage::ChatMessage(chat) => {
            handle_chat_message(state, connection_id, chat).await
        }
        ClientMessage::Typing { name } => handle_typing(state, connection_id, name).await,
    }
}

async fn handle_join(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    name: String,
) -> Option<ServerMessage> {
    if let Err(e) = state.relay.check_name(&name) {
        tracing::warn!(connection_id = %connection_id, "Rejected join: {}", e);
        return Some(e.into());
    }

    // No ack on success
    state.registry.on_join(connection_id, name).await;
    None
}

async fn handle_chat_message(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    chat: ChatMessage,
) -> Option<ServerMessage> {
    tracing::debug!(connection_id = %connection_id, text = ?chat.text(), "Chat message");
    match state.relay.on_chat_message(connection_id, chat).await {
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(connection_id = %connection_id, "Rejected chat message: {}", e);
            Some(e.into())
        }
    }
}

async fn handle_typing(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    name: String,
) -> Option<ServerMessage> {
    match state.relay.on_typing(connection_id, name).await {
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(connection_id = %connection_id, "Rejected typing notice: {}", e);
            Some(e.into())
        }
    }
}
