//! Session Tests
//!
//! Turn recording, persistence across restarts, degraded storage and
//! concurrent senders.

use crate::brain::{respond, Dispatcher, Intent};
use crate::conversation::{
    ConversationStore, KeyValueStore, MemoryKvStore, MessageRecord, Sender,
};
use crate::error::AppError;
use crate::session::{
    ChatSurface, FixedDelay, SessionHandle, SessionOptions, QUICK_REPLIES,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// --- Test Doubles ---

/// Store whose reads and writes always fail
struct BrokenStore;

#[async_trait]
impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, AppError> {
        Err(AppError::Storage("read failed".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), AppError> {
        Err(AppError::Storage("write failed".to_string()))
    }
}

/// Store that reads fine (empty) but rejects every write
struct ReadOnlyStore;

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, AppError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), AppError> {
        Err(AppError::Storage("disk is read-only".to_string()))
    }
}

/// Surface that records every call in order
#[derive(Default)]
struct RecordingSurface {
    events: Mutex<Vec<String>>,
}

impl RecordingSurface {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ChatSurface for RecordingSurface {
    fn render_message(&self, record: &MessageRecord) {
        let who = match record.sender() {
            Sender::User => "user",
            Sender::Bot => "bot",
        };
        self.events.lock().unwrap().push(format!("render:{}", who));
    }

    fn show_typing(&self) {
        self.events.lock().unwrap().push("typing:on".to_string());
    }

    fn hide_typing(&self) {
        self.events.lock().unwrap().push("typing:off".to_string());
    }
}

fn memory_options(kv: &MemoryKvStore) -> SessionOptions {
    SessionOptions::default().with_store(ConversationStore::new(Arc::new(kv.clone())))
}

#[cfg(test)]
mod turn_tests {
    use super::*;

    #[tokio::test]
    async fn test_n_turns_produce_2n_records() {
        let session = SessionHandle::start(SessionOptions::default()).await;
        let inputs = ["hello", "I need a website", "what about pricing?", "thanks"];

        let mut snapshots: Vec<Vec<MessageRecord>> = Vec::new();
        for input in inputs {
            session.send_message(input).await.unwrap();
            snapshots.push(session.history().await.unwrap());
        }

        let history = session.history().await.unwrap();
        assert_eq!(history.len(), 2 * inputs.len());

        // Earlier records are never rewritten by later turns
        for snapshot in &snapshots {
            assert_eq!(&history[..snapshot.len()], snapshot.as_slice());
        }

        for (i, pair) in history.chunks(2).enumerate() {
            assert_eq!(pair[0].sender(), Sender::User);
            assert_eq!(pair[0].content().as_text(), Some(inputs[i]));
            assert_eq!(pair[1].sender(), Sender::Bot);
            assert!(pair[0].timestamp() <= pair[1].timestamp());
        }
    }

    #[tokio::test]
    async fn test_reply_matches_dispatcher() {
        let session = SessionHandle::start(SessionOptions::default()).await;

        let reply = session.send_message("Can I book a meeting?").await.unwrap();
        assert_eq!(reply, Some(respond(Intent::ConsultationBooking, "")));
    }

    #[tokio::test]
    async fn test_input_is_trimmed_before_recording() {
        let session = SessionHandle::start(SessionOptions::default()).await;

        session.send_message("   hello   ").await.unwrap();

        let history = session.history().await.unwrap();
        assert_eq!(history[0].content().as_text(), Some("hello"));
    }

    #[tokio::test]
    async fn test_quick_reply_goes_through_dispatch() {
        let session = SessionHandle::start(SessionOptions::default()).await;

        let reply = session.send_quick_reply(2).await.unwrap();

        assert_eq!(reply, Some(respond(Intent::PricingInquiry, "")));
        let history = session.history().await.unwrap();
        assert_eq!(history[0].content().as_text(), Some(QUICK_REPLIES[2].message));
    }

    #[tokio::test]
    async fn test_surface_sees_typing_between_messages() {
        let surface = Arc::new(RecordingSurface::default());
        let options = SessionOptions::default().with_surface(surface.clone());
        let session = SessionHandle::start(options).await;

        session.send_message("hi").await.unwrap();
        session.send_message("   ").await.unwrap();

        assert_eq!(
            surface.events(),
            vec!["render:user", "typing:on", "typing:off", "render:bot"]
        );
    }

    #[tokio::test]
    async fn test_typing_delay_is_applied() {
        let options = SessionOptions::default().with_delay(FixedDelay(Duration::from_millis(30)));
        let session = SessionHandle::start(options).await;

        let start = Instant::now();
        session.send_message("hello").await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(30));
        assert_eq!(session.history().await.unwrap().len(), 2);
    }
}

#[cfg(test)]
mod persistence_tests {
    use super::*;

    #[tokio::test]
    async fn test_history_survives_restart() {
        let kv = MemoryKvStore::new();

        let first = SessionHandle::start(memory_options(&kv)).await;
        first.send_message("hello").await.unwrap();
        first.send_message("mobile app please").await.unwrap();
        let before = first.history().await.unwrap();
        first.shutdown().await.unwrap();

        let second = SessionHandle::start(memory_options(&kv)).await;
        assert!(!second.is_persistence_degraded());
        assert_eq!(second.history().await.unwrap(), before);

        second.send_message("thanks").await.unwrap();
        assert_eq!(second.history().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_broken_store_does_not_break_session() {
        let options = SessionOptions::default().with_store(ConversationStore::new(Arc::new(BrokenStore)));
        let session = SessionHandle::start(options).await;

        assert!(session.is_persistence_degraded());

        let reply = session.send_message("hello").await.unwrap();
        assert_eq!(reply, Some(respond(Intent::Greeting, "")));
        assert_eq!(session.history().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_write_marks_session_degraded() {
        let options = SessionOptions::default().with_store(ConversationStore::new(Arc::new(ReadOnlyStore)));
        let session = SessionHandle::start(options).await;
        assert!(!session.is_persistence_degraded());

        let reply = session.send_message("hello").await.unwrap();

        assert!(reply.is_some());
        assert!(session.is_persistence_degraded());
        assert_eq!(session.history().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_dismiss_write_marks_session_degraded() {
        let options = SessionOptions::default().with_store(ConversationStore::new(Arc::new(ReadOnlyStore)));
        let session = SessionHandle::start(options).await;

        let state = session.close().await.unwrap();

        assert!(state.dismissed);
        assert!(session.is_persistence_degraded());
    }

    #[tokio::test]
    async fn test_corrupt_history_starts_empty() {
        let kv = MemoryKvStore::new();
        kv.set("chatbotHistory", "[{]").await.unwrap();

        let session = SessionHandle::start(memory_options(&kv)).await;

        assert!(session.is_persistence_degraded());
        assert!(session.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_close_persists_dismissed_flag() {
        let kv = MemoryKvStore::new();

        let first = SessionHandle::start(memory_options(&kv)).await;
        let opened = first.open().await.unwrap();
        assert!(opened.open);
        let closed = first.close().await.unwrap();
        assert!(closed.dismissed);
        assert_eq!(kv.get("chatbotClosed").await.unwrap().as_deref(), Some("true"));

        let second = SessionHandle::start(memory_options(&kv)).await;
        let state = second.minimize().await.unwrap();
        assert!(state.dismissed);
        assert!(state.minimized);
        assert!(!state.should_nudge());
    }

    #[tokio::test]
    async fn test_shutdown_does_not_dismiss_widget() {
        let kv = MemoryKvStore::new();

        let session = SessionHandle::start(memory_options(&kv)).await;
        session.open().await.unwrap();
        session.send_message("hello").await.unwrap();
        session.shutdown().await.unwrap();

        assert_eq!(kv.get("chatbotClosed").await.unwrap(), None);

        let next = SessionHandle::start(memory_options(&kv)).await;
        let state = next.minimize().await.unwrap();
        assert!(!state.dismissed);
    }
}

#[cfg(test)]
mod concurrency_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_senders_keep_turns_adjacent() {
        let session = SessionHandle::start(SessionOptions::default()).await;
        let dispatcher = Dispatcher::new();

        let inputs: Vec<String> = (0..20)
            .map(|i| match i % 4 {
                0 => format!("hello #{}", i),
                1 => format!("website #{}", i),
                2 => format!("price #{}", i),
                _ => format!("question #{}", i),
            })
            .collect();

        let tasks = inputs.iter().cloned().map(|input| {
            let handle = session.clone();
            tokio::spawn(async move { handle.send_message(input).await })
        });
        for result in futures::future::join_all(tasks).await {
            assert!(result.expect("task panicked").expect("send failed").is_some());
        }

        let history = session.history().await.unwrap();
        assert_eq!(history.len(), 2 * inputs.len());

        for pair in history.chunks(2) {
            assert_eq!(pair[0].sender(), Sender::User);
            assert_eq!(pair[1].sender(), Sender::Bot);

            let text = pair[0].content().as_text().expect("user text");
            assert_eq!(Some(pair[1].content().clone()), dispatcher.handle_turn(text));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_queued_callers_do_not_time_out() {
        let mut options = SessionOptions::default().with_delay(FixedDelay(Duration::from_millis(200)));
        options.reply_timeout = Duration::from_millis(300);
        let session = SessionHandle::start(options).await;

        let tasks = ["hello", "website", "price"].into_iter().map(|input| {
            let handle = session.clone();
            tokio::spawn(async move { handle.send_message(input).await })
        });
        for result in futures::future::join_all(tasks).await {
            let reply = result.expect("task panicked");
            assert!(matches!(reply, Ok(Some(_))), "unexpected reply: {:?}", reply);
        }

        assert_eq!(session.history().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_abandoned_message_is_not_recorded() {
        let options = SessionOptions::default().with_delay(FixedDelay(Duration::from_millis(200)));
        let session = SessionHandle::start(options).await;

        let first = {
            let handle = session.clone();
            tokio::spawn(async move { handle.send_message("hello").await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Gives up while the first turn is still typing
        let abandoned =
            tokio::time::timeout(Duration::from_millis(50), session.send_message("website")).await;
        assert!(abandoned.is_err());

        assert!(first.await.expect("task panicked").unwrap().is_some());
        let history = session.history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content().as_text(), Some("hello"));
    }
}
