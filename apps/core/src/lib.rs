//! CoderBrothers assistant core.
//!
//! Rule-based FAQ chat: keyword intent classification (`brain`), an
//! append-only conversation history with pluggable persistence
//! (`conversation`), and a single-writer chat session (`session`).

pub mod brain;
pub mod config;
pub mod conversation;
pub mod error;
pub mod fs_manager;
pub mod session;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use brain::{Dispatcher, Intent, IntentClassifier, ResponsePayload};
pub use config::AssistantConfig;
pub use conversation::{ConversationLog, ConversationStore, MessageRecord, Sender};
pub use error::AppError;
pub use session::{SessionHandle, SessionOptions};
