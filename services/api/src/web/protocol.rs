//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API server
//! for the NewsGuardian chat assistant. All frames are JSON text tagged by `type`.

use news_guardian_core::domain::ChatMessage;
use serde::{Deserialize, Serialize};

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Posts a user message. Rejected with `busy` while a reply is pending.
    SendMessage { text: String },

    /// Abandons the pending reply, if any.
    Cancel,

    /// Asks for the full transcript.
    History,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The first message of every connection.
    Greeting { message: ChatMessage },

    /// Echoes the stored user message; the UI can show a typing indicator until
    /// the matching `BotReply` or an `Error` arrives.
    MessageAccepted { message: ChatMessage },

    BotReply { message: ChatMessage },

    History { messages: Vec<ChatMessage> },

    /// A recoverable failure; the client may retry.
    Error { kind: String, message: String },
}
