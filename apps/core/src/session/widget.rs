use serde::Serialize;

/// A preset message offered as a one-click reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuickReply {
    pub label: &'static str,
    pub message: &'static str,
}

pub static QUICK_REPLIES: &[QuickReply] = &[
    QuickReply {
        label: "Website Development",
        message: "I need a website for my business",
    },
    QuickReply {
        label: "Mobile App",
        message: "I want to build a mobile app",
    },
    QuickReply {
        label: "Get Quote",
        message: "What are your prices?",
    },
    QuickReply {
        label: "Book Consultation",
        message: "I'd like to book a consultation",
    },
];

/// Visibility state of the chat widget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WidgetState {
    pub open: bool,
    pub minimized: bool,
    /// Set once the user closes the widget; persisted across sessions.
    pub dismissed: bool,
}

impl WidgetState {
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.minimized = false;
        self.dismissed = true;
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn toggle_minimized(&mut self) {
        self.minimized = !self.minimized;
    }

    /// Whether the launcher should draw attention to itself.
    pub fn should_nudge(&self) -> bool {
        !self.open && !self.dismissed
    }
}
