use crate::conversation::MessageRecord;

/// Where a session shows its messages: a terminal, a web widget, a test
/// recorder.
pub trait ChatSurface: Send + Sync + 'static {
    fn render_message(&self, record: &MessageRecord);

    fn show_typing(&self);

    fn hide_typing(&self);
}

/// Surface that shows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl ChatSurface for NullSurface {
    fn render_message(&self, _record: &MessageRecord) {}

    fn show_typing(&self) {}

    fn hide_typing(&self) {}
}
