//! services/api/src/web/chat_task.rs
//!
//! This module contains the asynchronous "worker" function responsible for
//! producing one chat reply and delivering it, unless the request was
//! abandoned in the meantime.

use crate::web::{pipeline::guarded, protocol::ServerMessage, ws_handler::send_message};
use axum::extract::ws::Message;
use futures::Sink;
use news_guardian_core::chat::Conversation;
use news_guardian_core::error::{GuardianError, GuardianResult};
use news_guardian_core::intent::IntentResponder;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// The main asynchronous task for answering a single user message.
pub async fn reply_process<S>(
    responder: Arc<IntentResponder>,
    conversation: Arc<Mutex<Conversation>>,
    ws_sender: Arc<Mutex<S>>,
    request_id: Uuid,
    text: String,
    limit: Duration,
    token: CancellationToken,
) where
    S: Sink<Message> + Unpin + Send,
{
    let outcome = produce_reply(responder, text, limit, token).await;

    let message = {
        let mut conversation = conversation.lock().await;
        apply_reply(&mut conversation, request_id, outcome)
    };
    match message {
        Some(message) => {
            send_message(&ws_sender, &message).await;
        }
        None => info!("Reply {} was abandoned; discarding it.", request_id),
    }
}

/// Generates the reply text off the async runtime, bounded by `limit`.
pub async fn produce_reply(
    responder: Arc<IntentResponder>,
    text: String,
    limit: Duration,
    token: CancellationToken,
) -> GuardianResult<String> {
    guarded(token, limit, async move {
        tokio::task::spawn_blocking(move || responder.respond(&text))
            .await
            .map_err(|e| GuardianError::Analysis(format!("reply task failed: {}", e)))
    })
    .await
}

/// Records the outcome in the conversation and decides what, if anything, the client sees.
///
/// Returns `None` when the request is no longer the pending one.
pub fn apply_reply(
    conversation: &mut Conversation,
    request_id: Uuid,
    outcome: GuardianResult<String>,
) -> Option<ServerMessage> {
    match outcome {
        Ok(reply) => conversation
            .complete(request_id, &reply)
            .map(|message| ServerMessage::BotReply { message }),
        Err(GuardianError::Cancelled) => {
            conversation.abandon(request_id);
            None
        }
        Err(e) => {
            if !conversation.abandon(request_id) {
                return None;
            }
            warn!("Reply {} failed: {}", request_id, e);
            Some(ServerMessage::Error {
                kind: e.kind().to_string(),
                message: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use news_guardian_core::chat::ChatState;

    fn conversation_with_pending() -> (Conversation, Uuid) {
        let mut conversation = Conversation::new("Hello!");
        let (request_id, _) = conversation.submit("How do I detect fake news?").unwrap();
        (conversation, request_id)
    }

    #[tokio::test]
    async fn replies_come_from_the_responder() {
        let responder = Arc::new(IntentResponder::default());
        let reply = produce_reply(
            responder.clone(),
            "Please summarize this".to_string(),
            Duration::from_secs(1),
            CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(reply, responder.respond("Please summarize this"));
    }

    #[tokio::test]
    async fn a_cancelled_token_stops_the_reply() {
        let token = CancellationToken::new();
        token.cancel();
        let outcome = produce_reply(
            Arc::new(IntentResponder::default()),
            "hello".to_string(),
            Duration::from_secs(1),
            token,
        )
        .await;
        assert_eq!(outcome, Err(GuardianError::Cancelled));
    }

    #[test]
    fn a_reply_completes_the_pending_request() {
        let (mut conversation, request_id) = conversation_with_pending();
        let message = apply_reply(&mut conversation, request_id, Ok("Sure.".to_string()));

        assert!(matches!(message, Some(ServerMessage::BotReply { ref message }) if message.text == "Sure."));
        assert_eq!(conversation.state(), ChatState::Idle);
        assert_eq!(conversation.messages().len(), 3);
    }

    #[test]
    fn late_replies_are_discarded() {
        let (mut conversation, request_id) = conversation_with_pending();
        assert!(conversation.abandon(request_id));

        let message = apply_reply(&mut conversation, request_id, Ok("Too late.".to_string()));
        assert!(message.is_none());
        assert_eq!(conversation.messages().len(), 2);
    }

    #[test]
    fn failures_free_the_conversation_and_are_reported() {
        let (mut conversation, request_id) = conversation_with_pending();
        let message = apply_reply(
            &mut conversation,
            request_id,
            Err(GuardianError::Timeout(Duration::from_secs(10))),
        );

        assert!(matches!(message, Some(ServerMessage::Error { ref kind, .. }) if kind == "timeout"));
        assert_eq!(conversation.state(), ChatState::Idle);
        assert!(conversation.submit("Try again").is_ok());
    }
}
