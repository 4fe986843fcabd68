//! Conversation log

use crate::sentiment::SentimentResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Monotonic position of a message in the log. Never reused after rollback.
pub type SequenceId = u64;

/// Raised when a log operation is attempted that no correct caller would make
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invariant violation: {0}")]
pub struct InvariantViolation(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Bot,
}

/// A single entry in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sequence_id: SequenceId,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Present only on bot messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentResult>,
}

/// Append-only conversation log.
///
/// The single exception is [`SessionStore::rollback_last`], which exists to
/// undo an optimistic user message whose analysis failed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionStore {
    messages: Vec<Message>,
    next_sequence_id: SequenceId,
}

impl SessionStore {
    pub fn append_user(&mut self, text: impl Into<String>, at: DateTime<Utc>) -> SequenceId {
        self.push(Role::User, text.into(), None, at)
    }

    pub fn append_bot(
        &mut self,
        text: impl Into<String>,
        sentiment: SentimentResult,
        at: DateTime<Utc>,
    ) -> SequenceId {
        self.push(Role::Bot, text.into(), Some(sentiment), at)
    }

    /// Remove the most recent entry.
    pub fn rollback_last(&mut self) -> Result<Message, InvariantViolation> {
        self.messages
            .pop()
            .ok_or_else(|| InvariantViolation("rollback on empty conversation log".to_string()))
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn push(
        &mut self,
        role: Role,
        text: String,
        sentiment: Option<SentimentResult>,
        at: DateTime<Utc>,
    ) -> SequenceId {
        let sequence_id = self.next_sequence_id;
        self.next_sequence_id += 1;
        self.messages.push(Message {
            sequence_id,
            role,
            text,
            timestamp: at,
            sentiment,
        });
        sequence_id
    }
}
