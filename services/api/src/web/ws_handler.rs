//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a chat WebSocket connection.
//! It owns the conversation state machine and delegates reply generation.

use crate::web::{
    chat_task::reply_process,
    protocol::{ClientMessage, ServerMessage},
    state::{AppState, AuthContext},
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    Extension,
};
use futures::{
    stream::{SplitSink, StreamExt},
    Sink, SinkExt,
};
use news_guardian_core::chat::Conversation;
use std::sync::Arc;
use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// The reply currently being produced for this connection.
struct PendingReply {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PendingReply {
    fn stop(self) {
        self.token.cancel();
        self.handle.abort();
    }
}

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state, auth))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>, auth: AuthContext) {
    info!("New chat connection for session {}", auth.session_id);

    // The sender is wrapped in an Arc<Mutex<>> to allow for shared mutable access across tasks.
    let (sender, mut receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(sender));

    // --- 1. Greeting ---
    let conversation = Conversation::new(app_state.responder.greeting());
    let greeting = ServerMessage::Greeting {
        message: conversation.messages()[0].clone(),
    };
    let conversation = Arc::new(Mutex::new(conversation));
    if !send_message(&ws_sender, &greeting).await {
        return;
    }

    // --- 2. Main Message Loop ---
    let mut pending: Option<PendingReply> = None;
    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => {
                handle_text_message(
                    text.as_str(),
                    &app_state,
                    &conversation,
                    &ws_sender,
                    &mut pending,
                )
                .await;
            }
            Message::Close(_) => {
                info!("Client sent close message.");
                break;
            }
            _ => {}
        }
    }

    // --- 3. Cleanup ---
    if let Some(reply) = pending.take() {
        reply.stop();
    }
    info!("Chat connection for session {} closed.", auth.session_id);
}

/// Helper function to handle the logic for different `ClientMessage` variants.
async fn handle_text_message<S>(
    text: &str,
    app_state: &Arc<AppState>,
    conversation: &Arc<Mutex<Conversation>>,
    ws_sender: &Arc<Mutex<S>>,
    pending: &mut Option<PendingReply>,
) where
    S: Sink<Message> + Unpin + Send + 'static,
{
    let client_msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            let reply = ServerMessage::Error {
                kind: "validation".to_string(),
                message: format!("Unrecognized message: {}", e),
            };
            send_message(ws_sender, &reply).await;
            return;
        }
    };

    match client_msg {
        ClientMessage::SendMessage { text } => {
            let submitted = conversation.lock().await.submit(&text);
            let (request_id, message) = match submitted {
                Ok(accepted) => accepted,
                Err(e) => {
                    let reply = ServerMessage::Error {
                        kind: e.kind().to_string(),
                        message: e.to_string(),
                    };
                    send_message(ws_sender, &reply).await;
                    return;
                }
            };
            send_message(ws_sender, &ServerMessage::MessageAccepted { message }).await;

            let token = CancellationToken::new();
            let handle = tokio::spawn(reply_process(
                app_state.responder.clone(),
                conversation.clone(),
                ws_sender.clone(),
                request_id,
                text,
                app_state.config.chat_timeout,
                token.clone(),
            ));
            *pending = Some(PendingReply { token, handle });
        }
        ClientMessage::Cancel => {
            let mut conversation = conversation.lock().await;
            if let Some(request_id) = conversation.pending() {
                conversation.abandon(request_id);
                info!("Reply {} cancelled by the client.", request_id);
            }
            if let Some(reply) = pending.take() {
                reply.token.cancel();
            }
        }
        ClientMessage::History => {
            let messages = conversation.lock().await.messages().to_vec();
            send_message(ws_sender, &ServerMessage::History { messages }).await;
        }
    }
}

/// Serializes and sends one server message. Returns `false` if the client is gone.
pub async fn send_message<S>(ws_sender: &Arc<Mutex<S>>, message: &ServerMessage) -> bool
where
    S: Sink<Message> + Unpin,
{
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize server message: {}", e);
            return false;
        }
    };
    if ws_sender
        .lock()
        .await
        .send(Message::Text(json.into()))
        .await
        .is_err()
    {
        error!("Failed to send message to client.");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{LocalExtractor, MemoryStore};
    use crate::config::Config;
    use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
    use news_guardian_core::analysis::SeededScorer;
    use news_guardian_core::chat::ChatState;
    use serde_json::Value;

    struct Connection {
        app_state: Arc<AppState>,
        conversation: Arc<Mutex<Conversation>>,
        sender: Arc<Mutex<UnboundedSender<Message>>>,
        frames: UnboundedReceiver<Message>,
        pending: Option<PendingReply>,
    }

    impl Connection {
        fn open() -> Self {
            let app_state = Arc::new(AppState::new(
                Arc::new(Config::default()),
                Arc::new(MemoryStore::new()),
                Arc::new(LocalExtractor::new()),
                Arc::new(SeededScorer::new(0)),
            ));
            let conversation = Conversation::new(app_state.responder.greeting());
            let (sender, frames) = mpsc::unbounded();
            Self {
                app_state,
                conversation: Arc::new(Mutex::new(conversation)),
                sender: Arc::new(Mutex::new(sender)),
                frames,
                pending: None,
            }
        }

        async fn client_sends(&mut self, frame: &str) {
            handle_text_message(
                frame,
                &self.app_state,
                &self.conversation,
                &self.sender,
                &mut self.pending,
            )
            .await;
        }

        async fn next_frame(&mut self) -> Value {
            match self.frames.next().await {
                Some(Message::Text(text)) => serde_json::from_str(text.as_str()).unwrap(),
                other => panic!("expected a text frame, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn a_message_is_accepted_then_answered() {
        let mut conn = Connection::open();
        conn.client_sends(r#"{"type":"send_message","text":"How do I detect fake news?"}"#)
            .await;

        let accepted = conn.next_frame().await;
        assert_eq!(accepted["type"], "message_accepted");
        assert_eq!(accepted["message"]["text"], "How do I detect fake news?");

        let reply = conn.next_frame().await;
        assert_eq!(reply["type"], "bot_reply");
        let expected = conn.app_state.responder.respond("How do I detect fake news?");
        assert_eq!(reply["message"]["text"], expected.as_str());
        assert_eq!(conn.conversation.lock().await.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn a_second_message_is_busy_while_a_reply_is_pending() {
        let mut conn = Connection::open();
        conn.conversation.lock().await.submit("first").unwrap();

        conn.client_sends(r#"{"type":"send_message","text":"second"}"#).await;

        let frame = conn.next_frame().await;
        assert_eq!(frame["type"], "error");
        assert_eq!(frame["kind"], "busy");
        assert_eq!(conn.conversation.lock().await.messages().len(), 2);
    }

    #[tokio::test]
    async fn cancel_frees_the_conversation() {
        let mut conn = Connection::open();
        conn.conversation.lock().await.submit("first").unwrap();

        conn.client_sends(r#"{"type":"cancel"}"#).await;

        let conversation = conn.conversation.lock().await;
        assert_eq!(conversation.state(), ChatState::Idle);
        assert!(conversation.pending().is_none());
    }

    #[tokio::test]
    async fn history_returns_the_transcript() {
        let mut conn = Connection::open();
        conn.client_sends(r#"{"type":"history"}"#).await;

        let frame = conn.next_frame().await;
        assert_eq!(frame["type"], "history");
        let messages = frame["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["text"], conn.app_state.responder.greeting());
    }

    #[tokio::test]
    async fn unreadable_frames_are_reported_as_validation_errors() {
        let mut conn = Connection::open();
        conn.client_sends("{not json").await;

        let frame = conn.next_frame().await;
        assert_eq!(frame["type"], "error");
        assert_eq!(frame["kind"], "validation");
        assert!(conn.pending.is_none());
    }
}
