//! Dispatcher - classify a message, then run the matching handler.

use serde::Serialize;
use tracing::{debug, warn};

use super::intent::{Intent, IntentClassifier};
use super::responses::{respond, ResponsePayload};

/// Everything the dispatcher decided for one turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchOutcome {
    pub intent: Intent,
    pub matched_keyword: Option<&'static str>,
    pub payload: ResponsePayload,
}

/// Stateless classify-then-respond pipeline. Cheap to copy and safe to
/// share between sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher {
    classifier: IntentClassifier,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_classifier(IntentClassifier::new())
    }

    pub fn with_classifier(classifier: IntentClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// Produces the bot reply for `input`, or `None` when the input is
    /// empty or whitespace only.
    pub fn handle_turn(&self, input: &str) -> Option<ResponsePayload> {
        self.dispatch(input).map(|outcome| outcome.payload)
    }

    /// Same as [`Dispatcher::handle_turn`] but also reports the intent.
    pub fn dispatch(&self, input: &str) -> Option<DispatchOutcome> {
        if input.trim().is_empty() {
            return None;
        }

        let classification = self.classifier.classify_detailed(input);
        debug!(
            intent = %classification.intent,
            keyword = classification.matched_keyword.unwrap_or("-"),
            "Classified message"
        );

        Some(DispatchOutcome {
            intent: classification.intent,
            matched_keyword: classification.matched_keyword,
            payload: respond(classification.intent, input),
        })
    }

    /// Responds to an intent given by label, e.g. a quick reply that was
    /// tagged with its intent ahead of time. Unknown labels are a bug:
    /// debug builds panic, release builds answer with the General reply.
    pub fn respond_to_label(&self, label: &str, input: &str) -> ResponsePayload {
        let intent = match Intent::from_label(label) {
            Some(intent) => intent,
            None => {
                debug_assert!(false, "unknown intent label: {}", label);
                warn!(label, "Unknown intent label, using general reply");
                Intent::General
            }
        };
        respond(intent, input)
    }
}
