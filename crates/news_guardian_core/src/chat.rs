//! crates/news_guardian_core/src/chat.rs
//!
//! The per-connection chat conversation: an append-only message log plus the
//! `Idle -> AwaitingResponse -> Idle` state machine that gates new messages.

use uuid::Uuid;

use crate::domain::{Author, ChatMessage};
use crate::error::{GuardianError, GuardianResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    /// A reply is being produced for the request with this id.
    AwaitingResponse(Uuid),
}

#[derive(Debug)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    state: ChatState,
}

impl Conversation {
    /// Starts a conversation with the bot's greeting.
    pub fn new(greeting: &str) -> Self {
        Self {
            messages: vec![ChatMessage::new(Author::Bot, greeting)],
            state: ChatState::Idle,
        }
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Records a user message and starts waiting for the reply.
    ///
    /// Returns the request id the reply must be completed with.
    pub fn submit(&mut self, text: &str) -> GuardianResult<(Uuid, ChatMessage)> {
        if let ChatState::AwaitingResponse(_) = self.state {
            return Err(GuardianError::Busy);
        }
        if text.trim().is_empty() {
            return Err(GuardianError::Validation("message must not be empty".to_string()));
        }

        let message = ChatMessage::new(Author::User, text);
        self.messages.push(message.clone());
        let request_id = Uuid::new_v4();
        self.state = ChatState::AwaitingResponse(request_id);
        Ok((request_id, message))
    }

    /// Appends the bot's reply if `request_id` is still the one being awaited.
    pub fn complete(&mut self, request_id: Uuid, reply: &str) -> Option<ChatMessage> {
        if self.state != ChatState::AwaitingResponse(request_id) {
            return None;
        }
        let message = ChatMessage::new(Author::Bot, reply);
        self.messages.push(message.clone());
        self.state = ChatState::Idle;
        Some(message)
    }

    /// Returns to `Idle` without a reply after an error, timeout or cancellation.
    pub fn abandon(&mut self, request_id: Uuid) -> bool {
        if self.state != ChatState::AwaitingResponse(request_id) {
            return false;
        }
        self.state = ChatState::Idle;
        true
    }

    /// The request currently awaited, if any.
    pub fn pending(&self) -> Option<Uuid> {
        match self.state {
            ChatState::AwaitingResponse(id) => Some(id),
            ChatState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_with_the_greeting() {
        let convo = Conversation::new("hi");
        assert_eq!(convo.state(), ChatState::Idle);
        assert_eq!(convo.messages().len(), 1);
        assert_eq!(convo.messages()[0].author, Author::Bot);
    }

    #[test]
    fn second_message_while_awaiting_is_busy() {
        let mut convo = Conversation::new("hi");
        let (id, _) = convo.submit("first").unwrap();
        assert_eq!(convo.state(), ChatState::AwaitingResponse(id));
        assert_eq!(convo.submit("second"), Err(GuardianError::Busy));
        assert_eq!(convo.messages().len(), 2);

        let reply = convo.complete(id, "answer").unwrap();
        assert_eq!(reply.author, Author::Bot);
        assert_eq!(convo.state(), ChatState::Idle);
        assert!(convo.submit("second").is_ok());
    }

    #[test]
    fn blank_messages_are_rejected_without_state_change() {
        let mut convo = Conversation::new("hi");
        assert!(matches!(convo.submit("   "), Err(GuardianError::Validation(_))));
        assert_eq!(convo.state(), ChatState::Idle);
        assert_eq!(convo.messages().len(), 1);
    }

    #[test]
    fn stale_replies_are_discarded() {
        let mut convo = Conversation::new("hi");
        let (first, _) = convo.submit("one").unwrap();
        assert!(convo.abandon(first));
        let (second, _) = convo.submit("two").unwrap();

        assert!(convo.complete(first, "late answer").is_none());
        assert!(!convo.abandon(first));
        assert_eq!(convo.pending(), Some(second));

        convo.complete(second, "fresh answer").unwrap();
        let texts: Vec<&str> = convo.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["hi", "one", "two", "fresh answer"]);
    }
}
