use tokio::sync::oneshot;

use super::widget::WidgetState;
use crate::brain::ResponsePayload;
use crate::conversation::MessageRecord;
use crate::error::AppError;

/// Widget controls forwarded to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetCommand {
    Open,
    Close,
    Toggle,
    Minimize,
}

/// Messages that can be sent to the session runner.
#[derive(Debug)]
pub enum SessionMessage {
    /// A message typed (or picked) by the user.
    Submit {
        text: String,
        /// Signalled when the runner takes the message off the queue.
        accepted: oneshot::Sender<()>,
        /// `None` when the text was blank and no turn happened.
        responder: oneshot::Sender<Result<Option<ResponsePayload>, AppError>>,
    },
    /// A snapshot of the conversation so far.
    History {
        responder: oneshot::Sender<Vec<MessageRecord>>,
    },
    /// Open, close or minimize the widget; replies with the new state.
    Widget {
        command: WidgetCommand,
        accepted: oneshot::Sender<()>,
        responder: oneshot::Sender<WidgetState>,
    },
    /// Stop the runner after the messages already queued.
    Shutdown,
}
