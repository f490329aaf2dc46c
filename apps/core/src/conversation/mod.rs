//! Conversation history: immutable message records in an append-only log.

pub mod storage;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::brain::ResponsePayload;

pub use storage::{ConversationStore, KeyValueStore, MemoryKvStore, SqliteKvStore};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A single message in the conversation. Fields are private so a record
/// cannot change after it has been created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    sender: Sender,
    content: ResponsePayload,
    timestamp: DateTime<Utc>,
}

impl MessageRecord {
    pub fn new(sender: Sender, content: ResponsePayload, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender,
            content,
            timestamp,
        }
    }

    /// Record of text typed by the user, stamped now.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, ResponsePayload::text(text), Utc::now())
    }

    /// Record of a bot reply, stamped now.
    pub fn bot(payload: ResponsePayload) -> Self {
        Self::new(Sender::Bot, payload, Utc::now())
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn content(&self) -> &ResponsePayload {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Ordered, append-only sequence of messages. Serializes as a plain JSON
/// array of records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog {
    records: Vec<MessageRecord>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: MessageRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[MessageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&MessageRecord> {
        self.records.last()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

impl From<Vec<MessageRecord>> for ConversationLog {
    fn from(records: Vec<MessageRecord>) -> Self {
        Self { records }
    }
}
