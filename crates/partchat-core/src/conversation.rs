//! Conversation state and the turn state machine.
//!
//! Two states: Idle (`sending == false`) and Awaiting (`sending == true`).
//! A turn appends one user message on entry to Awaiting and exactly one
//! assistant message on the way back to Idle. Submissions while Awaiting,
//! and blank submissions, change nothing.

use crate::client::{ChatBackend, ChatReply, ClientError};
use crate::input::InputLine;
use crate::provider::Provider;
use crate::state::ChatMessage;

/// First message of every conversation.
pub const GREETING: &str = "Hi, how can I help you today?";

/// Shown when the backend could not be reached at all.
pub const REQUEST_FAILED: &str = "Request failed. Please try again later.";

/// A request the caller has to issue, produced by entering Awaiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub message: String,
    pub provider: Provider,
}

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    input: InputLine,
    provider: Provider,
    sending: bool,
}

impl Conversation {
    pub fn new(provider: Provider) -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING)],
            input: InputLine::new(),
            provider,
            sending: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &InputLine {
        &self.input
    }

    /// Editable input. Edits are ignored while a request is in flight.
    pub fn input_mut(&mut self) -> Option<&mut InputLine> {
        if self.sending {
            None
        } else {
            Some(&mut self.input)
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Takes effect from the next submission; an in-flight turn keeps the
    /// provider it was sent with.
    pub fn set_provider(&mut self, provider: Provider) {
        self.provider = provider;
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Submit whatever is in the input field.
    pub fn submit_input(&mut self) -> Option<PendingTurn> {
        let text = self.input.text().to_string();
        self.begin_turn(&text)
    }

    /// Idle -> Awaiting. Appends the user message and clears the input field.
    ///
    /// Returns `None` (and leaves everything untouched) when already
    /// awaiting a reply or when `text` is blank.
    pub fn begin_turn(&mut self, text: &str) -> Option<PendingTurn> {
        if self.sending {
            tracing::debug!("submission dropped: a request is already in flight");
            return None;
        }

        let message = text.trim();
        if message.is_empty() {
            return None;
        }

        self.sending = true;
        self.messages.push(ChatMessage::user(message));
        self.input.clear();

        Some(PendingTurn {
            message: message.to_string(),
            provider: self.provider,
        })
    }

    /// Awaiting -> Idle, appending the assistant message for `outcome`.
    ///
    /// Returns `false` if there was no turn to settle.
    pub fn settle(&mut self, outcome: Result<ChatReply, ClientError>) -> bool {
        if !self.sending {
            tracing::debug!("ignoring completion with no turn in flight");
            return false;
        }

        let content = match outcome {
            Ok(reply) => reply.content,
            Err(err) => {
                tracing::warn!(%err, "chat request failed");
                REQUEST_FAILED.to_string()
            }
        };

        self.messages.push(ChatMessage::assistant(content));
        self.sending = false;
        true
    }

    /// Run one whole turn against `backend`. Returns whether a turn ran.
    pub async fn send<B>(&mut self, backend: &B, text: &str) -> bool
    where
        B: ChatBackend + ?Sized,
    {
        let Some(turn) = self.begin_turn(text) else {
            return false;
        };

        let outcome = backend.send(&turn.message, turn.provider).await;
        self.settle(outcome)
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(Provider::default())
    }
}
