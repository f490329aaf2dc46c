//! # Session
//!
//! One chat session per widget instance. A `SessionHandle` can be cloned
//! and shared (several tabs, several tasks); every request goes through a
//! channel to a single `SessionRunner`, which is the only writer of the
//! conversation log. Replies come back over oneshot channels.

pub mod delay;
pub mod messages;
pub mod surface;
pub mod widget;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::brain::{Dispatcher, ResponsePayload};
use crate::config::AssistantConfig;
use crate::conversation::{ConversationLog, ConversationStore, MessageRecord};
use crate::error::AppError;

pub use delay::{DelayPolicy, FixedDelay, NoDelay, RandomDelay};
pub use messages::{SessionMessage, WidgetCommand};
pub use surface::{ChatSurface, NullSurface};
pub use widget::{QuickReply, WidgetState, QUICK_REPLIES};

/// Everything a session needs, injected at construction.
#[derive(Clone)]
pub struct SessionOptions {
    pub dispatcher: Dispatcher,
    pub store: Option<ConversationStore>,
    pub delay: Arc<dyn DelayPolicy>,
    pub surface: Arc<dyn ChatSurface>,
    pub channel_capacity: usize,
    pub reply_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            dispatcher: Dispatcher::new(),
            store: None,
            delay: Arc::new(NoDelay),
            surface: Arc::new(NullSurface),
            channel_capacity: 32,
            reply_timeout: Duration::from_secs(30),
        }
    }
}

impl SessionOptions {
    /// Options derived from configuration: random typing delay, channel
    /// size and reply timeout. Storage and surface are left to the caller.
    pub fn from_config(config: &AssistantConfig) -> Self {
        Self {
            delay: Arc::new(RandomDelay::new(
                config.typing_delay_min(),
                config.typing_delay_max(),
            )),
            channel_capacity: config.channel_capacity,
            reply_timeout: config.reply_timeout(),
            ..Self::default()
        }
    }

    pub fn with_store(mut self, store: ConversationStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_delay(mut self, delay: impl DelayPolicy) -> Self {
        self.delay = Arc::new(delay);
        self
    }

    pub fn with_surface(mut self, surface: Arc<dyn ChatSurface>) -> Self {
        self.surface = surface;
        self
    }
}

/// A handle to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
    session_id: Uuid,
    reply_timeout: Duration,
    persistence_degraded: Arc<AtomicBool>,
}

impl SessionHandle {
    /// Loads persisted state, then spawns the runner.
    ///
    /// A store that cannot be read does not prevent the session from
    /// starting: it begins with an empty history and
    /// [`SessionHandle::is_persistence_degraded`] reports `true`. Later
    /// write failures set the same flag.
    pub async fn start(options: SessionOptions) -> Self {
        let session_id = Uuid::new_v4();
        let mut persistence_degraded = false;
        let mut log = ConversationLog::new();
        let mut widget = WidgetState::default();

        if let Some(store) = &options.store {
            match store.load().await {
                Ok(loaded) => log = loaded,
                Err(e) => {
                    warn!(%session_id, "Could not load conversation history: {}", e);
                    persistence_degraded = true;
                }
            }
            match store.is_dismissed().await {
                Ok(dismissed) => widget.dismissed = dismissed,
                Err(e) => warn!(%session_id, "Could not read widget state: {}", e),
            }
        }

        info!(%session_id, records = log.len(), "Session started");

        let persistence_degraded = Arc::new(AtomicBool::new(persistence_degraded));
        let (sender, receiver) = mpsc::channel(options.channel_capacity.max(1));
        let runner = SessionRunner {
            receiver,
            session_id,
            persistence_degraded: persistence_degraded.clone(),
            dispatcher: options.dispatcher,
            store: options.store,
            delay: options.delay,
            surface: options.surface,
            log,
            widget,
        };
        tokio::spawn(async move { runner.run().await });

        Self {
            sender,
            session_id,
            reply_timeout: options.reply_timeout,
            persistence_degraded,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// `true` once the store has failed a read at start or any later write.
    /// The in-memory conversation keeps working either way.
    pub fn is_persistence_degraded(&self) -> bool {
        self.persistence_degraded.load(Ordering::Acquire)
    }

    /// Submits user text and waits for the bot reply.
    ///
    /// Returns `Ok(None)` for blank input; nothing is recorded in that case.
    /// Time spent queued behind other turns does not count against the
    /// reply timeout.
    #[instrument(skip_all, fields(session = %self.session_id))]
    pub async fn send_message(
        &self,
        text: impl Into<String>,
    ) -> Result<Option<ResponsePayload>, AppError> {
        let text = text.into();
        self.request_accepted(|accepted, responder| SessionMessage::Submit {
            text,
            accepted,
            responder,
        })
        .await?
    }

    /// Sends the preset message of `QUICK_REPLIES[index]`.
    pub async fn send_quick_reply(
        &self,
        index: usize,
    ) -> Result<Option<ResponsePayload>, AppError> {
        let reply = QUICK_REPLIES
            .get(index)
            .ok_or_else(|| AppError::Validation(format!("no quick reply at index {}", index)))?;
        self.send_message(reply.message).await
    }

    pub async fn history(&self) -> Result<Vec<MessageRecord>, AppError> {
        self.request(|responder| SessionMessage::History { responder })
            .await
    }

    pub async fn widget(&self, command: WidgetCommand) -> Result<WidgetState, AppError> {
        self.request_accepted(|accepted, responder| SessionMessage::Widget {
            command,
            accepted,
            responder,
        })
        .await
    }

    pub async fn open(&self) -> Result<WidgetState, AppError> {
        self.widget(WidgetCommand::Open).await
    }

    pub async fn close(&self) -> Result<WidgetState, AppError> {
        self.widget(WidgetCommand::Close).await
    }

    pub async fn toggle(&self) -> Result<WidgetState, AppError> {
        self.widget(WidgetCommand::Toggle).await
    }

    pub async fn minimize(&self) -> Result<WidgetState, AppError> {
        self.widget(WidgetCommand::Minimize).await
    }

    /// Asks the runner to stop once queued messages are handled.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        self.sender
            .send(SessionMessage::Shutdown)
            .await
            .map_err(|e| AppError::Session(e.to_string()))
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionMessage,
    ) -> Result<T, AppError> {
        let (send, recv) = oneshot::channel();
        self.sender
            .send(build(send))
            .await
            .map_err(|e| AppError::Session(e.to_string()))?;
        timeout(self.reply_timeout, recv)
            .await?
            .map_err(|e| AppError::Session(e.to_string()))
    }

    /// Like `request`, for messages that change session state. The timeout
    /// starts once the runner has dequeued the message, so a caller is never
    /// told a turn failed while it still waits in the queue. A caller that
    /// gives up before then is skipped by the runner.
    async fn request_accepted<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<()>, oneshot::Sender<T>) -> SessionMessage,
    ) -> Result<T, AppError> {
        let (accepted_send, accepted_recv) = oneshot::channel();
        let (send, recv) = oneshot::channel();
        self.sender
            .send(build(accepted_send, send))
            .await
            .map_err(|e| AppError::Session(e.to_string()))?;
        accepted_recv
            .await
            .map_err(|e| AppError::Session(e.to_string()))?;
        timeout(self.reply_timeout, recv)
            .await?
            .map_err(|e| AppError::Session(e.to_string()))
    }
}

// --- Session Runner ---
struct SessionRunner {
    receiver: mpsc::Receiver<SessionMessage>,
    session_id: Uuid,
    persistence_degraded: Arc<AtomicBool>,
    dispatcher: Dispatcher,
    store: Option<ConversationStore>,
    delay: Arc<dyn DelayPolicy>,
    surface: Arc<dyn ChatSurface>,
    log: ConversationLog,
    widget: WidgetState,
}

impl SessionRunner {
    async fn run(mut self) {
        debug!(session = %self.session_id, "Session runner started");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                SessionMessage::Submit {
                    text,
                    accepted,
                    responder,
                } => {
                    if accepted.send(()).is_err() {
                        debug!(session = %self.session_id, "Caller gone, dropping message");
                        continue;
                    }
                    let result = self.handle_submit(text).await;
                    if let Err(e) = &result {
                        error!(session = %self.session_id, "Error handling message: {}", e);
                    }
                    let _ = responder.send(result);
                }
                SessionMessage::History { responder } => {
                    let _ = responder.send(self.log.records().to_vec());
                }
                SessionMessage::Widget {
                    command,
                    accepted,
                    responder,
                } => {
                    if accepted.send(()).is_err() {
                        debug!(session = %self.session_id, "Caller gone, dropping widget command");
                        continue;
                    }
                    let state = self.handle_widget(command).await;
                    let _ = responder.send(state);
                }
                SessionMessage::Shutdown => {
                    info!(session = %self.session_id, "Session shutting down");
                    break;
                }
            }
        }
        debug!(session = %self.session_id, "Session runner stopped");
    }

    async fn handle_submit(&mut self, text: String) -> Result<Option<ResponsePayload>, AppError> {
        let text = text.trim();
        let Some(outcome) = self.dispatcher.dispatch(text) else {
            debug!(session = %self.session_id, "Ignoring blank message");
            return Ok(None);
        };

        self.record(MessageRecord::user(text)).await;

        self.surface.show_typing();
        let pause = self.delay.next_delay();
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        self.surface.hide_typing();

        info!(
            session = %self.session_id,
            intent = %outcome.intent,
            keyword = outcome.matched_keyword.unwrap_or("-"),
            "Replying"
        );
        self.record(MessageRecord::bot(outcome.payload.clone())).await;

        Ok(Some(outcome.payload))
    }

    /// Appends, shows and persists one record.
    async fn record(&mut self, record: MessageRecord) {
        self.surface.render_message(&record);
        self.log.append(record);

        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.log).await {
                warn!(session = %self.session_id, "Could not persist conversation history: {}", e);
                self.persistence_degraded.store(true, Ordering::Release);
            }
        }
    }

    async fn handle_widget(&mut self, command: WidgetCommand) -> WidgetState {
        let was_dismissed = self.widget.dismissed;
        match command {
            WidgetCommand::Open => self.widget.open(),
            WidgetCommand::Close => self.widget.close(),
            WidgetCommand::Toggle => self.widget.toggle(),
            WidgetCommand::Minimize => self.widget.toggle_minimized(),
        }

        if self.widget.dismissed && !was_dismissed {
            if let Some(store) = &self.store {
                if let Err(e) = store.set_dismissed().await {
                    warn!(session = %self.session_id, "Could not persist widget state: {}", e);
                    self.persistence_degraded.store(true, Ordering::Release);
                }
            }
        }
        self.widget
    }
}
